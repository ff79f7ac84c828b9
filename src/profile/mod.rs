//! Account area: personal details, password, saved travellers, booking
//! history, and preferences.

pub mod details;
pub mod password;
pub mod preferences;
pub mod tabs;
pub mod travellers;

pub use details::PersonalDetailsForm;
pub use password::PasswordForm;
pub use preferences::{Currency, Language, NotificationSettings, Preferences, SeatPreference};
pub use tabs::{ProfileTab, require_identity};
pub use travellers::TravellerBook;

use crate::api::{ApiReply, BookingsApi};
use crate::error::{Result, SessionError};
use crate::models::Booking;
use crate::session::SessionStore;

/// The signed-in user's bookings.
pub async fn booking_history(
    bookings: &BookingsApi,
    session: &SessionStore,
) -> Result<ApiReply<Vec<Booking>>> {
    let token = session.token().await.ok_or(SessionError::NotAuthenticated)?;
    Ok(bookings.user_bookings(Some(&token)).await?)
}
