//! Personal details form.

use tracing::info;

use crate::api::{AccountService, ApiReply, ProfileUpdate};
use crate::error::{Result, SessionError, ValidationError};
use crate::models::User;
use crate::session::SessionStore;

pub const TITLES: [&str; 5] = ["Mr", "Mrs", "Miss", "Ms", "Dr"];

/// Editable copy of the signed-in user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalDetailsForm {
    pub title: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub dob: String,
    pub nationality: String,
    pub passport_country: String,
    pub passport_number: String,
    pub passport_issue_date: String,
    pub passport_expiry_date: String,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl PersonalDetailsForm {
    /// Seed the form from `user`. `dob` falls back to `dateOfBirth`.
    pub fn from_user(user: &User) -> Self {
        Self {
            title: text(&user.title),
            first_name: user.first_name.clone(),
            middle_name: text(&user.middle_name),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: text(&user.phone),
            gender: text(&user.gender),
            dob: user
                .dob
                .clone()
                .or_else(|| user.date_of_birth.clone())
                .unwrap_or_default(),
            nationality: text(&user.nationality),
            passport_country: text(&user.passport_country),
            passport_number: text(&user.passport_number),
            passport_issue_date: text(&user.passport_issue_date),
            passport_expiry_date: text(&user.passport_expiry_date),
        }
    }

    pub fn validate(&self) -> std::result::Result<ProfileUpdate, ValidationError> {
        let missing: Vec<&'static str> = [
            ("first name", self.first_name.trim().is_empty()),
            ("last name", self.last_name.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, blank)| blank.then_some(field))
        .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }
        if !self.title.is_empty() && !TITLES.contains(&self.title.as_str()) {
            return Err(ValidationError::UnknownOption {
                field: "title",
                value: self.title.clone(),
            });
        }
        Ok(ProfileUpdate {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: non_empty(&self.phone),
            date_of_birth: non_empty(&self.dob),
        })
    }

    /// Send the update and replace the session's user record with the result.
    pub async fn submit(
        &self,
        account: &dyn AccountService,
        session: &SessionStore,
    ) -> Result<ApiReply<User>> {
        let update = self.validate()?;
        let Some(identity) = session.current().await else {
            return Err(SessionError::NotAuthenticated.into());
        };

        let reply = account
            .update_profile(&update, Some(identity.bearer()))
            .await?;

        let accepted = &reply.data;
        let mut user = identity.user;
        user.first_name = accepted.first_name.clone();
        user.last_name = accepted.last_name.clone();
        user.phone = accepted.phone.clone();
        user.date_of_birth = accepted.date_of_birth.clone();
        user.dob = non_empty(&self.dob);
        user.title = non_empty(&self.title);
        user.middle_name = non_empty(&self.middle_name);
        user.gender = non_empty(&self.gender);
        user.nationality = non_empty(&self.nationality);
        user.passport_country = non_empty(&self.passport_country);
        user.passport_number = non_empty(&self.passport_number);
        user.passport_issue_date = non_empty(&self.passport_issue_date);
        user.passport_expiry_date = non_empty(&self.passport_expiry_date);

        session.update_user(user.clone()).await?;
        info!(user_id = %user.id, demo = reply.demo, "Personal details saved");
        Ok(reply.map(|_| user))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::{AuthService, LoginPayload, PasswordChange};
    use crate::error::{ApiError, Error};
    use crate::models::{Credentials, Registration};
    use crate::storage::MemoryStore;

    struct SignedInAuth;

    #[async_trait]
    impl AuthService for SignedInAuth {
        fn check_user_exists(&self, _email: &str) -> bool {
            true
        }
        async fn send_verification_code(&self, _: &str) -> std::result::Result<ApiReply<()>, ApiError> {
            Ok(ApiReply::live((), None))
        }
        async fn verify_code(&self, _: &str, _: &str) -> std::result::Result<ApiReply<()>, ApiError> {
            Ok(ApiReply::live((), None))
        }
        async fn register(
            &self,
            _: &Registration,
        ) -> std::result::Result<ApiReply<Option<User>>, ApiError> {
            Ok(ApiReply::live(None, None))
        }
        async fn login(
            &self,
            c: &Credentials,
        ) -> std::result::Result<ApiReply<LoginPayload>, ApiError> {
            let mut user = User::new("u1", &c.email, "Ada", "Lovelace");
            user.date_of_birth = Some("1815-12-10".into());
            Ok(ApiReply::live(
                LoginPayload {
                    user: Some(user),
                    token: Some("tok".into()),
                },
                None,
            ))
        }
    }

    /// Records the token and echoes the update.
    #[derive(Default)]
    struct EchoAccount {
        seen_token: Mutex<Option<String>>,
    }

    #[async_trait]
    impl AccountService for EchoAccount {
        async fn update_profile(
            &self,
            update: &ProfileUpdate,
            token: Option<&str>,
        ) -> std::result::Result<ApiReply<ProfileUpdate>, ApiError> {
            *self.seen_token.lock().unwrap() = token.map(str::to_string);
            Ok(ApiReply::live(update.clone(), Some("Profile updated".into())))
        }
        async fn change_password(
            &self,
            _: &PasswordChange,
            _: Option<&str>,
        ) -> std::result::Result<ApiReply<()>, ApiError> {
            Ok(ApiReply::live((), None))
        }
    }

    async fn signed_in() -> SessionStore {
        let session =
            SessionStore::load(Arc::new(MemoryStore::new()), Arc::new(SignedInAuth)).await;
        session
            .login(&Credentials::new("ada@test.com", "pw"))
            .await
            .unwrap();
        session
    }

    #[tokio::test]
    async fn form_seeds_dob_from_date_of_birth() {
        let session = signed_in().await;
        let form = PersonalDetailsForm::from_user(&session.user().await.unwrap());
        assert_eq!(form.dob, "1815-12-10");
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.title, "");
    }

    #[test]
    fn names_are_required() {
        let form = PersonalDetailsForm {
            first_name: " ".into(),
            last_name: "X".into(),
            ..Default::default()
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingFields {
                fields: vec!["first name"]
            })
        );
    }

    #[test]
    fn unknown_title_is_rejected() {
        let form = PersonalDetailsForm {
            title: "Sir".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            ..Default::default()
        };
        assert!(matches!(
            form.validate(),
            Err(ValidationError::UnknownOption { field: "title", .. })
        ));
    }

    #[tokio::test]
    async fn submit_updates_session_user() {
        let session = signed_in().await;
        let account = EchoAccount::default();
        let mut form = PersonalDetailsForm::from_user(&session.user().await.unwrap());
        form.title = "Dr".into();
        form.last_name = "King".into();
        form.phone = "+44 20".into();
        form.passport_number = "P123".into();

        let reply = form.submit(&account, &session).await.unwrap();
        assert_eq!(reply.message.as_deref(), Some("Profile updated"));
        assert_eq!(account.seen_token.lock().unwrap().as_deref(), Some("tok"));

        let user = session.user().await.unwrap();
        assert_eq!(user.last_name, "King");
        assert_eq!(user.title.as_deref(), Some("Dr"));
        assert_eq!(user.phone.as_deref(), Some("+44 20"));
        assert_eq!(user.passport_number.as_deref(), Some("P123"));
        assert_eq!(user.middle_name, None);
        assert_eq!(reply.data, user);
    }

    #[tokio::test]
    async fn submit_requires_session() {
        let session =
            SessionStore::load(Arc::new(MemoryStore::new()), Arc::new(SignedInAuth)).await;
        let form = PersonalDetailsForm {
            first_name: "A".into(),
            last_name: "B".into(),
            ..Default::default()
        };
        let err = form
            .submit(&EchoAccount::default(), &session)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NotAuthenticated)));
    }
}
