//! Change-password form.

use secrecy::{ExposeSecret, SecretString};

use crate::api::{AccountService, ApiReply, PasswordChange};
use crate::error::{Result, SessionError, ValidationError};
use crate::session::SessionStore;

pub struct PasswordForm {
    pub current: SecretString,
    pub new: SecretString,
    pub confirm: SecretString,
}

impl PasswordForm {
    pub fn new(
        current: impl Into<String>,
        new: impl Into<String>,
        confirm: impl Into<String>,
    ) -> Self {
        Self {
            current: SecretString::from(current.into()),
            new: SecretString::from(new.into()),
            confirm: SecretString::from(confirm.into()),
        }
    }

    pub fn validate(&self) -> std::result::Result<PasswordChange, ValidationError> {
        let missing: Vec<&'static str> = [
            ("current password", &self.current),
            ("new password", &self.new),
            ("password confirmation", &self.confirm),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.expose_secret().is_empty().then_some(field))
        .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }
        if self.new.expose_secret() != self.confirm.expose_secret() {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(PasswordChange {
            current_password: self.current.clone(),
            new_password: self.new.clone(),
        })
    }

    pub async fn submit(
        &self,
        account: &dyn AccountService,
        session: &SessionStore,
    ) -> Result<ApiReply<()>> {
        let change = self.validate()?;
        let token = session.token().await.ok_or(SessionError::NotAuthenticated)?;
        Ok(account.change_password(&change, Some(&token)).await?)
    }
}

impl std::fmt::Debug for PasswordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordForm([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_reported() {
        let err = PasswordForm::new("old", "", "").validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["new password", "password confirmation"]
            }
        );
    }

    #[test]
    fn confirmation_must_match() {
        let err = PasswordForm::new("old", "new1", "new2").validate().unwrap_err();
        assert_eq!(err, ValidationError::PasswordMismatch);
    }

    #[test]
    fn valid_form_builds_change() {
        let change = PasswordForm::new("old", "new", "new").validate().unwrap();
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["currentPassword"], "old");
        assert_eq!(json["newPassword"], "new");
    }
}
