//! Profile and password endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::client::ApiClient;
use super::fallback::{ApiReply, DemoFallback};
use crate::error::ApiError;
use crate::models::user::expose;

/// Body of `PUT /user/profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// Body of `POST /user/change-password`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    #[serde(serialize_with = "expose")]
    pub current_password: SecretString,
    #[serde(serialize_with = "expose")]
    pub new_password: SecretString,
}

impl PasswordChange {
    pub fn new(current: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            current_password: SecretString::from(current.into()),
            new_password: SecretString::from(new.into()),
        }
    }
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordChange([REDACTED])")
    }
}

/// Account operations used by the profile area.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Update the profile. The reply holds the fields the server accepted.
    async fn update_profile(
        &self,
        update: &ProfileUpdate,
        token: Option<&str>,
    ) -> Result<ApiReply<ProfileUpdate>, ApiError>;

    async fn change_password(
        &self,
        change: &PasswordChange,
        token: Option<&str>,
    ) -> Result<ApiReply<()>, ApiError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileBody {
    user: Option<ProfileUpdate>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MessageBody {
    message: Option<String>,
}

pub struct AccountApi {
    client: Arc<ApiClient>,
    fallback: Arc<DemoFallback>,
}

impl AccountApi {
    pub fn new(client: Arc<ApiClient>, fallback: Arc<DemoFallback>) -> Self {
        Self { client, fallback }
    }
}

#[async_trait]
impl AccountService for AccountApi {
    async fn update_profile(
        &self,
        update: &ProfileUpdate,
        token: Option<&str>,
    ) -> Result<ApiReply<ProfileUpdate>, ApiError> {
        let call = async {
            let body: ProfileBody = self.client.put_json("/user/profile", update, token).await?;
            // Servers that reply with only a message accepted the submission as-is.
            let user = body.user.unwrap_or_else(|| update.clone());
            Ok(ApiReply::live(user, body.message))
        };
        let reply = self
            .fallback
            .guard("update_profile", call, || {
                ApiReply::demo(update.clone(), "Profile updated successfully (demo mode)")
            })
            .await?;
        info!(demo = reply.demo, "Profile updated");
        Ok(reply)
    }

    async fn change_password(
        &self,
        change: &PasswordChange,
        token: Option<&str>,
    ) -> Result<ApiReply<()>, ApiError> {
        let call = async {
            let body: MessageBody = self
                .client
                .post_json("/user/change-password", change, token)
                .await?;
            Ok(ApiReply::live((), body.message))
        };
        let reply = self
            .fallback
            .guard("change_password", call, || {
                ApiReply::demo((), "Password changed successfully (demo mode)")
            })
            .await?;
        info!(demo = reply.demo, "Password changed");
        Ok(reply)
    }
}
