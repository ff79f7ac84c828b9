//! AuthModal: drives the wizard against the auth API and the session store.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::state::{Completion, Field, Outcome, Step, Submission, Wizard};
use crate::api::AuthService;
use crate::error::{ValidationError, WizardError};
use crate::session::SessionStore;

pub const CODE_SENT_NOTICE: &str = "OTP sent to your email! (Use any code for demo)";
pub const CODE_RESENT_NOTICE: &str = "OTP resent!";
pub const SIGNED_IN_NOTICE: &str = "Signed in successfully!";
pub const REGISTERED_NOTICE: &str = "Registration successful!";

/// Read-only copy of the wizard for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardView {
    pub open: bool,
    pub step: Step,
    pub email: String,
    pub error: Option<String>,
    pub pending: bool,
}

/// What a call to [`AuthModal::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReport {
    /// Validation failed before any call was made.
    Invalid(ValidationError),
    Completed {
        completion: Completion,
        notice: Option<&'static str>,
        /// The call behind this step was answered by the demo fallback.
        demo: bool,
    },
}

/// The sign-in / sign-up modal.
///
/// The wizard lock is only held between awaits, so `close` and `back` can run
/// while a submission is in flight; its late result is then discarded.
pub struct AuthModal {
    wizard: Mutex<Wizard>,
    auth: Arc<dyn AuthService>,
    session: Arc<SessionStore>,
}

impl AuthModal {
    pub fn new(auth: Arc<dyn AuthService>, session: Arc<SessionStore>) -> Self {
        Self {
            wizard: Mutex::new(Wizard::new()),
            auth,
            session,
        }
    }

    pub async fn view(&self) -> WizardView {
        let w = self.wizard.lock().await;
        WizardView {
            open: w.is_open(),
            step: w.step(),
            email: w.email().to_string(),
            error: w.error().map(str::to_string),
            pending: w.is_pending(),
        }
    }

    pub async fn open(&self) {
        self.wizard.lock().await.open();
        debug!("Auth modal opened");
    }

    pub async fn close(&self) {
        self.wizard.lock().await.close();
        debug!("Auth modal closed");
    }

    pub async fn back(&self) -> bool {
        self.wizard.lock().await.back()
    }

    pub async fn set(&self, field: Field, value: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.lock().await.set(field, value)
    }

    /// Submit the current step.
    pub async fn submit(&self) -> Result<SubmitReport, WizardError> {
        let (ticket, submission) = match self.wizard.lock().await.begin_submit()? {
            Ok(started) => started,
            Err(invalid) => return Ok(SubmitReport::Invalid(invalid)),
        };
        let step = ticket.step();
        debug!(%step, "Submitting wizard step");

        let (outcome, demo) = self.run(submission).await;
        let notice = match (&outcome, step) {
            (Outcome::CodeSent, _) => Some(CODE_SENT_NOTICE),
            (Outcome::SignedIn, Step::SignIn) => Some(SIGNED_IN_NOTICE),
            (Outcome::SignedIn, Step::Register) => Some(REGISTERED_NOTICE),
            _ => None,
        };

        let completion = self.wizard.lock().await.complete(ticket, outcome)?;
        let (notice, demo) = match completion {
            Completion::Advanced(_) | Completion::Finished => (notice, demo),
            Completion::Kept(_) => (None, false),
            Completion::Stale => {
                debug!(%step, "Discarded result of abandoned submission");
                (None, false)
            }
        };
        Ok(SubmitReport::Completed {
            completion,
            notice,
            demo,
        })
    }

    /// Send another code while on the VerifyOtp step.
    pub async fn resend_code(&self) -> Result<&'static str, WizardError> {
        let email = {
            let w = self.wizard.lock().await;
            if !w.is_open() {
                return Err(WizardError::Closed);
            }
            if w.step() != Step::VerifyOtp {
                return Err(WizardError::InvalidTransition {
                    from: w.step().to_string(),
                    to: Step::VerifyOtp.to_string(),
                });
            }
            if w.is_pending() {
                return Err(WizardError::SubmissionPending);
            }
            w.email().to_string()
        };
        if let Err(e) = self.auth.send_verification_code(&email).await {
            warn!(error = %e, "Resending verification code failed");
        }
        Ok(CODE_RESENT_NOTICE)
    }

    /// Run the step's operation. The flag is set when the reply was
    /// synthesized by the demo fallback.
    async fn run(&self, submission: Submission) -> (Outcome, bool) {
        match submission {
            Submission::CheckEmail { email } => {
                if self.auth.check_user_exists(&email) {
                    return (Outcome::ExistingUser, false);
                }
                match self.auth.send_verification_code(&email).await {
                    Ok(reply) => {
                        info!(%email, demo = reply.demo, "Verification code sent");
                        (Outcome::CodeSent, reply.demo)
                    }
                    Err(e) => failed(e, "Something went wrong. Please try again."),
                }
            }
            Submission::SignIn { credentials } => match self.session.login(&credentials).await {
                Ok(reply) => (Outcome::SignedIn, reply.demo),
                Err(e) => failed(e, "Login failed. Please check your credentials."),
            },
            Submission::VerifyCode { email, code } => {
                match self.auth.verify_code(&email, &code).await {
                    Ok(reply) => (Outcome::CodeVerified, reply.demo),
                    Err(e) => failed(e, "Invalid or expired OTP."),
                }
            }
            Submission::Register { registration } => {
                match self.session.register(&registration).await {
                    Ok(reply) => (Outcome::SignedIn, reply.demo),
                    Err(e) => failed(e, "Registration failed. Please try again."),
                }
            }
        }
    }
}

fn failed(err: impl std::fmt::Display, fallback: &str) -> (Outcome, bool) {
    let text = err.to_string();
    warn!(error = %text, "Wizard step failed");
    if text.trim().is_empty() {
        (Outcome::Failed(fallback.to_string()), false)
    } else {
        (Outcome::Failed(text), false)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::api::{ApiReply, LoginPayload};
    use crate::error::ApiError;
    use crate::models::{Credentials, Registration, User};
    use crate::storage::MemoryStore;

    /// Auth double: `@test.com` addresses exist, login for `bad@test.com`
    /// fails, and login or code checks wait on their gate when one is set.
    #[derive(Default)]
    struct MockAuth {
        gate: Option<Arc<Notify>>,
        verify_gate: Option<Arc<Notify>>,
        sends: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl AuthService for MockAuth {
        fn check_user_exists(&self, email: &str) -> bool {
            email.ends_with("@test.com")
        }

        async fn send_verification_code(&self, _email: &str) -> Result<ApiReply<()>, ApiError> {
            self.sends.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(ApiReply::demo((), "sent"))
        }

        async fn verify_code(&self, _email: &str, _otp: &str) -> Result<ApiReply<()>, ApiError> {
            if let Some(gate) = &self.verify_gate {
                gate.notified().await;
            }
            Ok(ApiReply::demo((), "ok"))
        }

        async fn register(
            &self,
            r: &Registration,
        ) -> Result<ApiReply<Option<User>>, ApiError> {
            let user = User::new("demo_1", &r.email, &r.first_name, &r.last_name);
            Ok(ApiReply::demo(Some(user), "registered"))
        }

        async fn login(&self, c: &Credentials) -> Result<ApiReply<LoginPayload>, ApiError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if c.email == "bad@test.com" {
                return Err(ApiError::Application {
                    status: reqwest::StatusCode::UNAUTHORIZED,
                    message: "Invalid credentials".into(),
                });
            }
            Ok(ApiReply::live(
                LoginPayload {
                    user: Some(User::new("u1", &c.email, "A", "User")),
                    token: Some("tok".into()),
                },
                None,
            ))
        }
    }

    async fn modal_with(auth: MockAuth) -> (Arc<AuthModal>, Arc<SessionStore>) {
        modal_over(Arc::new(auth)).await
    }

    async fn modal_over(auth: Arc<dyn AuthService>) -> (Arc<AuthModal>, Arc<SessionStore>) {
        let session =
            Arc::new(SessionStore::load(Arc::new(MemoryStore::new()), auth.clone()).await);
        let modal = Arc::new(AuthModal::new(auth, session.clone()));
        modal.open().await;
        (modal, session)
    }

    fn completion(report: SubmitReport) -> Completion {
        match report {
            SubmitReport::Completed { completion, .. } => completion,
            SubmitReport::Invalid(e) => panic!("unexpected validation error: {e}"),
        }
    }

    #[tokio::test]
    async fn new_account_walks_all_four_steps() {
        let (modal, session) = modal_with(MockAuth::default()).await;

        modal.set(Field::Email, "new@x.com").await.unwrap();
        let report = modal.submit().await.unwrap();
        assert_eq!(
            report,
            SubmitReport::Completed {
                completion: Completion::Advanced(Step::VerifyOtp),
                notice: Some(CODE_SENT_NOTICE),
                demo: true,
            }
        );
        assert_eq!(modal.resend_code().await.unwrap(), CODE_RESENT_NOTICE);

        modal.set(Field::Code, "000000").await.unwrap();
        assert_eq!(
            completion(modal.submit().await.unwrap()),
            Completion::Advanced(Step::Register)
        );

        modal.set(Field::FirstName, "New").await.unwrap();
        modal.set(Field::LastName, "Person").await.unwrap();
        modal.set(Field::Password, "pw").await.unwrap();
        let report = modal.submit().await.unwrap();
        assert_eq!(
            report,
            SubmitReport::Completed {
                completion: Completion::Finished,
                notice: Some(REGISTERED_NOTICE),
                demo: false,
            }
        );
        assert!(!modal.view().await.open);
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn failed_login_stays_on_sign_in() {
        let (modal, session) = modal_with(MockAuth::default()).await;
        modal.set(Field::Email, "bad@test.com").await.unwrap();
        assert_eq!(
            completion(modal.submit().await.unwrap()),
            Completion::Advanced(Step::SignIn)
        );

        modal.set(Field::Password, "nope").await.unwrap();
        assert_eq!(
            completion(modal.submit().await.unwrap()),
            Completion::Kept(Step::SignIn)
        );
        let view = modal.view().await;
        assert_eq!(view.step, Step::SignIn);
        assert_eq!(view.error.as_deref(), Some("Invalid credentials"));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn validation_error_makes_no_call() {
        let (modal, _session) = modal_with(MockAuth::default()).await;
        let report = modal.submit().await.unwrap();
        assert_eq!(
            report,
            SubmitReport::Invalid(ValidationError::Required { field: "email" })
        );
        assert!(!modal.view().await.pending);
    }

    #[tokio::test]
    async fn close_during_login_discards_result() {
        let gate = Arc::new(Notify::new());
        let (modal, _session) = modal_with(MockAuth {
            gate: Some(gate.clone()),
            ..Default::default()
        })
        .await;
        modal.set(Field::Email, "a@test.com").await.unwrap();
        modal.submit().await.unwrap();
        modal.set(Field::Password, "pw").await.unwrap();

        let in_flight = tokio::spawn({
            let modal = modal.clone();
            async move { modal.submit().await }
        });
        while !modal.view().await.pending {
            tokio::task::yield_now().await;
        }
        assert!(matches!(modal.submit().await, Err(WizardError::SubmissionPending)));

        modal.close().await;
        modal.open().await;
        gate.notify_one();

        let report = in_flight.await.unwrap().unwrap();
        assert_eq!(completion(report), Completion::Stale);
        let view = modal.view().await;
        assert!(view.open);
        assert_eq!(view.step, Step::EmailEntry);
        assert_eq!(view.email, "");
    }

    #[tokio::test]
    async fn resend_refused_while_code_check_pending() {
        let gate = Arc::new(Notify::new());
        let auth = Arc::new(MockAuth {
            verify_gate: Some(gate.clone()),
            ..Default::default()
        });
        let (modal, _session) = modal_over(auth.clone()).await;
        modal.set(Field::Email, "new@x.com").await.unwrap();
        modal.submit().await.unwrap();
        modal.set(Field::Code, "123456").await.unwrap();
        assert_eq!(auth.sends.load(std::sync::atomic::Ordering::SeqCst), 1);

        let in_flight = tokio::spawn({
            let modal = modal.clone();
            async move { modal.submit().await }
        });
        while !modal.view().await.pending {
            tokio::task::yield_now().await;
        }
        assert_eq!(modal.resend_code().await, Err(WizardError::SubmissionPending));
        assert_eq!(auth.sends.load(std::sync::atomic::Ordering::SeqCst), 1);

        gate.notify_one();
        let report = in_flight.await.unwrap().unwrap();
        assert_eq!(completion(report), Completion::Advanced(Step::Register));
    }

    #[tokio::test]
    async fn demo_replies_are_flagged() {
        let (modal, _session) = modal_with(MockAuth::default()).await;
        modal.set(Field::Email, "a@test.com").await.unwrap();
        // No call is made for an existing account.
        assert!(matches!(
            modal.submit().await.unwrap(),
            SubmitReport::Completed { demo: false, .. }
        ));
        modal.back().await;
        modal.set(Field::Email, "new@x.com").await.unwrap();
        modal.submit().await.unwrap();
        modal.set(Field::Code, "1").await.unwrap();
        assert!(matches!(
            modal.submit().await.unwrap(),
            SubmitReport::Completed {
                completion: Completion::Advanced(Step::Register),
                demo: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn resend_requires_verify_step() {
        let (modal, _session) = modal_with(MockAuth::default()).await;
        assert!(modal.resend_code().await.is_err());
    }
}
