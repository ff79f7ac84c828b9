//! Demo fallback that keeps the client usable when the backend is unreachable.
//!
//! Every higher-level operation runs its shim call through [`DemoFallback`].
//! When the call fails with a masked [`FailureClass`], the operation's locally
//! synthesized payload is returned instead and the reply is flagged as demo
//! data. Configuration failures are never masked.

use std::collections::HashSet;
use std::future::Future;

use rand::Rng;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Classification of shim failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Configuration,
    Connectivity,
    Application,
    Decode,
}

impl FailureClass {
    pub fn of(err: &ApiError) -> Self {
        match err {
            ApiError::NotConfigured => Self::Configuration,
            ApiError::Connectivity { .. } => Self::Connectivity,
            ApiError::Application { .. } => Self::Application,
            ApiError::Decode { .. } => Self::Decode,
        }
    }
}

/// Payload returned by an API operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply<T> {
    pub data: T,
    /// Message supplied by the server or by the fallback.
    pub message: Option<String>,
    /// True when `data` was synthesized locally.
    pub demo: bool,
}

impl<T> ApiReply<T> {
    pub fn live(data: T, message: Option<String>) -> Self {
        Self {
            data,
            message,
            demo: false,
        }
    }

    pub fn demo(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
            demo: true,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiReply<U> {
        ApiReply {
            data: f(self.data),
            message: self.message,
            demo: self.demo,
        }
    }
}

/// Decorator that swaps masked failures for synthesized success payloads.
#[derive(Debug, Clone)]
pub struct DemoFallback {
    enabled: bool,
    masked: HashSet<FailureClass>,
    demo_domain: String,
}

impl DemoFallback {
    /// Fallback masking connectivity, application, and decode failures.
    pub fn new(demo_domain: impl Into<String>) -> Self {
        Self {
            enabled: true,
            masked: [
                FailureClass::Connectivity,
                FailureClass::Application,
                FailureClass::Decode,
            ]
            .into_iter()
            .collect(),
            demo_domain: demo_domain.into().to_lowercase(),
        }
    }

    /// Fallback that lets every failure through.
    pub fn disabled(demo_domain: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(demo_domain)
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        if config.demo_fallback {
            Self::new(&config.demo_domain)
        } else {
            Self::disabled(&config.demo_domain)
        }
    }

    /// Replace the allow-list of masked failure classes.
    /// [`FailureClass::Configuration`] is dropped if present.
    pub fn with_masked(mut self, classes: impl IntoIterator<Item = FailureClass>) -> Self {
        self.masked = classes
            .into_iter()
            .filter(|c| *c != FailureClass::Configuration)
            .collect();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn demo_domain(&self) -> &str {
        &self.demo_domain
    }

    /// Whether `email` belongs to the demo domain.
    pub fn is_demo_email(&self, email: &str) -> bool {
        email.trim().to_lowercase().ends_with(&self.demo_domain)
    }

    /// Whether `err` would be replaced by a synthesized payload.
    pub fn masks(&self, err: &ApiError) -> bool {
        self.enabled && self.masked.contains(&FailureClass::of(err))
    }

    /// Run `call`; on a masked failure return `synthesize()` instead.
    pub async fn guard<T, Fut, F>(
        &self,
        operation: &str,
        call: Fut,
        synthesize: F,
    ) -> Result<ApiReply<T>, ApiError>
    where
        Fut: Future<Output = Result<ApiReply<T>, ApiError>>,
        F: FnOnce() -> ApiReply<T>,
    {
        self.guard_when(operation, true, call, synthesize).await
    }

    /// Like [`guard`](Self::guard), but only masks when `eligible` holds.
    pub async fn guard_when<T, Fut, F>(
        &self,
        operation: &str,
        eligible: bool,
        call: Fut,
        synthesize: F,
    ) -> Result<ApiReply<T>, ApiError>
    where
        Fut: Future<Output = Result<ApiReply<T>, ApiError>>,
        F: FnOnce() -> ApiReply<T>,
    {
        match call.await {
            Ok(reply) => Ok(reply),
            Err(err) if eligible && self.masks(&err) => {
                warn!(operation, error = %err, "API failed, serving demo payload");
                Ok(synthesize())
            }
            Err(err) => Err(err),
        }
    }
}

/// Nine random base-36 characters, used to build demo identifiers.
pub fn demo_suffix() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
