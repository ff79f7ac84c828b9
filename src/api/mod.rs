//! Backend API: the gateway shim, the demo fallback policy, and one module
//! per endpoint group.

pub mod account;
pub mod auth;
pub mod bookings;
pub mod client;
pub mod fallback;
pub mod flights;

pub use account::{AccountApi, AccountService, PasswordChange, ProfileUpdate};
pub use auth::{AuthApi, AuthService, LoginPayload};
pub use bookings::BookingsApi;
pub use client::{ApiClient, ResponseBody};
pub use fallback::{ApiReply, DemoFallback, FailureClass, demo_suffix};
pub use flights::FlightsApi;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ConfigError;

/// Every endpoint group sharing one HTTP client and fallback policy.
#[derive(Clone)]
pub struct Api {
    pub auth: Arc<AuthApi>,
    pub flights: Arc<FlightsApi>,
    pub bookings: Arc<BookingsApi>,
    pub account: Arc<AccountApi>,
}

impl Api {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = Arc::new(ApiClient::new(config)?);
        let fallback = Arc::new(DemoFallback::from_config(config));
        Ok(Self::new(client, fallback))
    }

    pub fn new(client: Arc<ApiClient>, fallback: Arc<DemoFallback>) -> Self {
        Self {
            auth: Arc::new(AuthApi::new(client.clone(), fallback.clone())),
            flights: Arc::new(FlightsApi::new(client.clone(), fallback.clone())),
            bookings: Arc::new(BookingsApi::new(client.clone(), fallback.clone())),
            account: Arc::new(AccountApi::new(client, fallback)),
        }
    }
}
