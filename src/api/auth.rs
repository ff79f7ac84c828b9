//! Authentication endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::client::ApiClient;
use super::fallback::{ApiReply, DemoFallback, demo_suffix};
use crate::error::ApiError;
use crate::models::{Credentials, Registration, User};

/// User and token returned by a login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPayload {
    pub user: Option<User>,
    pub token: Option<String>,
}

/// Operations the sign-in flow and session store depend on.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Whether an account exists for `email`. Never touches the network.
    fn check_user_exists(&self, email: &str) -> bool;

    /// Ask the backend to email a one-time code.
    async fn send_verification_code(&self, email: &str) -> Result<ApiReply<()>, ApiError>;

    /// Check a one-time code.
    async fn verify_code(&self, email: &str, otp: &str) -> Result<ApiReply<()>, ApiError>;

    /// Create an account.
    async fn register(&self, registration: &Registration)
    -> Result<ApiReply<Option<User>>, ApiError>;

    /// Exchange credentials for a user record and session token.
    async fn login(&self, credentials: &Credentials) -> Result<ApiReply<LoginPayload>, ApiError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegisterBody {
    user: Option<User>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginBody {
    user: Option<User>,
    token: Option<String>,
    message: Option<String>,
}

/// Auth endpoints backed by the gateway shim.
pub struct AuthApi {
    client: Arc<ApiClient>,
    fallback: Arc<DemoFallback>,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>, fallback: Arc<DemoFallback>) -> Self {
        Self { client, fallback }
    }
}

#[async_trait]
impl AuthService for AuthApi {
    fn check_user_exists(&self, email: &str) -> bool {
        let exists = self.fallback.is_demo_email(email);
        debug!(email, exists, "Checked whether user exists");
        exists
    }

    async fn send_verification_code(&self, email: &str) -> Result<ApiReply<()>, ApiError> {
        let call = async {
            let body: MessageBody = self
                .client
                .post_json("/auth/send-otp", &serde_json::json!({ "email": email }), None)
                .await?;
            Ok(ApiReply::live((), body.message))
        };
        self.fallback
            .guard("send_verification_code", call, || {
                ApiReply::demo((), "OTP sent successfully (demo mode)")
            })
            .await
    }

    async fn verify_code(&self, email: &str, otp: &str) -> Result<ApiReply<()>, ApiError> {
        let call = async {
            let body: MessageBody = self
                .client
                .post_json(
                    "/auth/verify-otp",
                    &serde_json::json!({ "email": email, "otp": otp }),
                    None,
                )
                .await?;
            Ok(ApiReply::live((), body.message))
        };
        self.fallback
            .guard("verify_code", call, || {
                ApiReply::demo((), "OTP verified successfully (demo mode)")
            })
            .await
    }

    async fn register(
        &self,
        registration: &Registration,
    ) -> Result<ApiReply<Option<User>>, ApiError> {
        let call = async {
            let body: RegisterBody = self
                .client
                .post_json("/auth/register", registration, None)
                .await?;
            Ok(ApiReply::live(body.user, body.message))
        };
        let reply = self
            .fallback
            .guard("register", call, || {
                let user = User::new(
                    format!("demo_{}", demo_suffix()),
                    &registration.email,
                    &registration.first_name,
                    &registration.last_name,
                );
                ApiReply::demo(Some(user), "Registration successful (demo mode)")
            })
            .await?;
        info!(email = %registration.email, demo = reply.demo, "Registered account");
        Ok(reply)
    }

    async fn login(&self, credentials: &Credentials) -> Result<ApiReply<LoginPayload>, ApiError> {
        let call = async {
            let body: LoginBody = self
                .client
                .post_json("/auth/login", credentials, None)
                .await?;
            Ok(ApiReply::live(
                LoginPayload {
                    user: body.user,
                    token: body.token,
                },
                body.message,
            ))
        };
        let eligible = self.fallback.is_demo_email(&credentials.email);
        let reply = self
            .fallback
            .guard_when("login", eligible, call, || demo_login(&credentials.email))
            .await?;
        info!(email = %credentials.email, demo = reply.demo, "Logged in");
        Ok(reply)
    }
}

/// Synthesized login for a demo-domain account: the local part, capitalized,
/// becomes the first name.
fn demo_login(email: &str) -> ApiReply<LoginPayload> {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    let first_name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    let user = User::new(
        format!("demo_user_{}", demo_suffix()),
        email,
        first_name,
        "User",
    );
    ApiReply::demo(
        LoginPayload {
            user: Some(user),
            token: Some(format!("demo_token_{}", demo_suffix())),
        },
        "Login successful (demo mode)",
    )
}
