//! Session store: the single source of truth for who is signed in.
//!
//! Holds at most one [`Identity`], mirrors it into three storage keys, and
//! broadcasts a payload-free [`AuthStateChanged`] signal whenever it changes.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use crate::api::{ApiReply, AuthService};
use crate::error::SessionError;
use crate::models::{Credentials, Identity, Registration, User};
use crate::storage::{KeyValueStore, keys, load_json, save_json};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

const SESSION_KEYS: [&str; 3] = [keys::CURRENT_USER, keys::AUTH_TOKEN, keys::IS_AUTHENTICATED];

/// Emitted after every login, logout, and profile replacement. Subscribers
/// re-read the store to learn the new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthStateChanged;

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    auth: Arc<dyn AuthService>,
    identity: RwLock<Option<Identity>>,
    tx: broadcast::Sender<AuthStateChanged>,
}

impl SessionStore {
    /// Hydrate from storage.
    ///
    /// Starts signed in only when both the token and a parseable profile are
    /// stored. Anything else, including read failures, starts signed out.
    pub async fn load(storage: Arc<dyn KeyValueStore>, auth: Arc<dyn AuthService>) -> Self {
        let identity = hydrate(storage.as_ref()).await;
        match &identity {
            Some(identity) => info!(user_id = %identity.user.id, "Restored session"),
            None => info!("No stored session"),
        }
        let (tx, _rx) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            storage,
            auth,
            identity: RwLock::new(identity),
            tx,
        }
    }

    /// Subscribe to change signals.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthStateChanged> {
        self.tx.subscribe()
    }

    pub async fn current(&self) -> Option<Identity> {
        self.identity.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.identity.read().await.as_ref().map(|i| i.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.identity.read().await.is_some()
    }

    /// The bearer token of the current session.
    pub async fn token(&self) -> Option<String> {
        self.identity
            .read()
            .await
            .as_ref()
            .map(|i| i.token.expose_secret().to_string())
    }

    /// Sign in. A reply missing either the user or the token is rejected and
    /// leaves the current session untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<ApiReply<User>, SessionError> {
        let reply = self.auth.login(credentials).await?;
        let ApiReply {
            data,
            message,
            demo,
        } = reply;
        let (Some(user), Some(token)) = (data.user, data.token) else {
            warn!(email = %credentials.email, "Login reply missing user or token");
            return Err(SessionError::IncompleteLogin);
        };

        let identity = Identity::new(user.clone(), token);
        self.persist(&identity).await?;
        *self.identity.write().await = Some(identity);
        info!(user_id = %user.id, demo, "Session started");
        let _ = self.tx.send(AuthStateChanged);

        Ok(ApiReply {
            data: user,
            message,
            demo,
        })
    }

    /// Create an account, then sign in with the same credentials.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<ApiReply<User>, SessionError> {
        let reply = self.auth.register(registration).await?;
        if reply.data.is_none() {
            return Err(SessionError::RegistrationRejected(
                reply
                    .message
                    .unwrap_or_else(|| "no account was returned".to_string()),
            ));
        }
        self.login(&registration.credentials()).await
    }

    /// Sign out. The in-memory session is cleared even if storage fails.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let previous = self.identity.write().await.take();
        let _ = self.tx.send(AuthStateChanged);
        if let Some(identity) = previous {
            info!(user_id = %identity.user.id, "Session ended");
        }

        for key in SESSION_KEYS {
            self.storage.remove(key).await?;
        }
        Ok(())
    }

    /// Replace the signed-in user's profile record, keeping the token.
    pub async fn update_user(&self, user: User) -> Result<(), SessionError> {
        if !self.is_authenticated().await {
            return Err(SessionError::NotAuthenticated);
        }
        save_json(self.storage.as_ref(), keys::CURRENT_USER, &user).await?;
        match self.identity.write().await.as_mut() {
            Some(identity) => identity.user = user,
            // Signed out while the profile was being written.
            None => return Err(SessionError::NotAuthenticated),
        }
        let _ = self.tx.send(AuthStateChanged);
        Ok(())
    }

    /// Write the three session keys. On failure the previous values are put
    /// back so storage keeps matching the in-memory session.
    async fn persist(&self, identity: &Identity) -> Result<(), SessionError> {
        let mut previous = Vec::with_capacity(SESSION_KEYS.len());
        for key in SESSION_KEYS {
            previous.push((key, self.storage.get(key).await?));
        }
        let written = async {
            save_json(self.storage.as_ref(), keys::CURRENT_USER, &identity.user).await?;
            self.storage.set(keys::AUTH_TOKEN, identity.bearer()).await?;
            self.storage.set(keys::IS_AUTHENTICATED, "true").await
        }
        .await;
        if let Err(e) = written {
            warn!(error = %e, "Failed to persist session, restoring previous values");
            for (key, value) in previous {
                let restored = match value {
                    Some(value) => self.storage.set(key, &value).await,
                    None => self.storage.remove(key).await,
                };
                if let Err(e) = restored {
                    warn!(key, error = %e, "Failed to restore session key");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }
}

async fn hydrate(storage: &dyn KeyValueStore) -> Option<Identity> {
    let token = match storage.get(keys::AUTH_TOKEN).await {
        Ok(token) => token?,
        Err(e) => {
            warn!(error = %e, "Could not read stored token");
            return None;
        }
    };
    match load_json::<User>(storage, keys::CURRENT_USER).await {
        Ok(Some(user)) => Some(Identity::new(user, token)),
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Stored profile is unreadable, starting signed out");
            None
        }
    }
}
