//! Profile area navigation.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::models::Identity;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileTab {
    #[default]
    PersonalDetails,
    SavedTravelers,
    BookingHistory,
    PaymentMethods,
    Notifications,
    Preferences,
}

impl ProfileTab {
    pub const ALL: [ProfileTab; 6] = [
        Self::PersonalDetails,
        Self::SavedTravelers,
        Self::BookingHistory,
        Self::PaymentMethods,
        Self::Notifications,
        Self::Preferences,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::PersonalDetails => "personal-details",
            Self::SavedTravelers => "saved-travelers",
            Self::BookingHistory => "booking-history",
            Self::PaymentMethods => "payment-methods",
            Self::Notifications => "notifications",
            Self::Preferences => "preferences",
        }
    }

    /// Tab for `slug`, or the default tab when the slug is unknown.
    pub fn from_slug(slug: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|tab| tab.slug() == slug.trim())
            .unwrap_or_default()
    }

    /// Heading shown above the tab content.
    pub fn title(&self) -> String {
        self.slug().replace('-', " ")
    }
}

impl std::fmt::Display for ProfileTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// The profile area is only reachable with a signed-in session.
pub async fn require_identity(session: &SessionStore) -> Result<Identity, SessionError> {
    session.current().await.ok_or(SessionError::NotAuthenticated)
}
