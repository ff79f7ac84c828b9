//! Travel preferences and notification settings.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageError;
use crate::storage::{KeyValueStore, keys, load_json, save_json};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    French,
    Spanish,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Ngn,
}

impl Currency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Usd => "USD - US Dollar",
            Self::Eur => "EUR - Euro",
            Self::Ngn => "NGN - Nigerian Naira",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatPreference {
    #[default]
    Window,
    Aisle,
    NoPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email: bool,
    pub sms: bool,
    pub promotional: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
            promotional: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: Language,
    pub currency: Currency,
    pub seat: SeatPreference,
    pub notifications: NotificationSettings,
}

impl Preferences {
    /// Stored preferences, or defaults when none are stored or they are
    /// unreadable.
    pub async fn load(storage: &dyn KeyValueStore) -> Self {
        match load_json(storage, keys::USER_PREFERENCES).await {
            Ok(prefs) => prefs.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Stored preferences unreadable, using defaults");
                Self::default()
            }
        }
    }

    pub async fn save(&self, storage: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(storage, keys::USER_PREFERENCES, self).await
    }
}
