//! Auth wizard state machine.
//!
//! Pure and synchronous: [`Wizard::begin_submit`] validates the current step
//! and hands back a [`Submission`] describing the network work to do, and
//! [`Wizard::complete`] applies its [`Outcome`]. Every open, close, and back
//! bumps an epoch, so an outcome issued before one of those is recognised as
//! stale and dropped.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, WizardError};
use crate::models::{Credentials, Registration};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// The four wizard steps, numbered 1..=4.
///
/// EmailEntry → SignIn (existing account) or EmailEntry → VerifyOtp → Register
/// (new account). Back returns any later step to EmailEntry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    EmailEntry,
    SignIn,
    VerifyOtp,
    Register,
}

impl Step {
    pub fn number(&self) -> u8 {
        match self {
            Self::EmailEntry => 1,
            Self::SignIn => 2,
            Self::VerifyOtp => 3,
            Self::Register => 4,
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Step) -> bool {
        use Step::*;
        matches!(
            (self, target),
            (EmailEntry, SignIn)
                | (EmailEntry, VerifyOtp)
                | (VerifyOtp, Register)
                | (SignIn, EmailEntry)
                | (VerifyOtp, EmailEntry)
                | (Register, EmailEntry)
        )
    }

    /// Whether a successful submit on this step signs the user in and ends
    /// the wizard.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SignIn | Self::Register)
    }

    /// Fields the step's form shows.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Self::EmailEntry => &[Field::Email],
            Self::SignIn => &[Field::Password],
            Self::VerifyOtp => &[Field::Code],
            Self::Register => &[Field::FirstName, Field::LastName, Field::Password],
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EmailEntry => "email_entry",
            Self::SignIn => "sign_in",
            Self::VerifyOtp => "verify_otp",
            Self::Register => "register",
        };
        write!(f, "{s}")
    }
}

/// An editable wizard field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Email,
    Password,
    Code,
    FirstName,
    LastName,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Code => "verification code",
            Self::FirstName => "first name",
            Self::LastName => "last name",
        }
    }
}

/// Step together with the values only that step collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepData {
    EmailEntry,
    SignIn {
        password: String,
    },
    VerifyOtp {
        code: String,
    },
    Register {
        first_name: String,
        last_name: String,
        password: String,
    },
}

impl StepData {
    pub fn step(&self) -> Step {
        match self {
            Self::EmailEntry => Step::EmailEntry,
            Self::SignIn { .. } => Step::SignIn,
            Self::VerifyOtp { .. } => Step::VerifyOtp,
            Self::Register { .. } => Step::Register,
        }
    }

    fn fresh(step: Step) -> Self {
        match step {
            Step::EmailEntry => Self::EmailEntry,
            Step::SignIn => Self::SignIn {
                password: String::new(),
            },
            Step::VerifyOtp => Self::VerifyOtp {
                code: String::new(),
            },
            Step::Register => Self::Register {
                first_name: String::new(),
                last_name: String::new(),
                password: String::new(),
            },
        }
    }

    fn slot(&mut self, field: Field) -> Option<&mut String> {
        match (self, field) {
            (Self::SignIn { password }, Field::Password) => Some(password),
            (Self::VerifyOtp { code }, Field::Code) => Some(code),
            (Self::Register { first_name, .. }, Field::FirstName) => Some(first_name),
            (Self::Register { last_name, .. }, Field::LastName) => Some(last_name),
            (Self::Register { password, .. }, Field::Password) => Some(password),
            _ => None,
        }
    }
}

/// Identifies one in-flight submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    step: Step,
}

impl Ticket {
    pub fn step(&self) -> Step {
        self.step
    }
}

/// Network work a validated submit asks the driver to perform.
#[derive(Debug, Clone)]
pub enum Submission {
    /// Classify the email and, for a new account, send a verification code.
    CheckEmail { email: String },
    SignIn { credentials: Credentials },
    VerifyCode { email: String, code: String },
    Register { registration: Registration },
}

/// Result of a submission, reported back by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The email belongs to an existing account.
    ExistingUser,
    /// A code was sent to a new address.
    CodeSent,
    CodeVerified,
    /// The session now holds an identity.
    SignedIn,
    /// The operation failed; the text is shown and the step is kept.
    Failed(String),
}

/// What [`Wizard::complete`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The wizard is now on this step.
    Advanced(Step),
    /// The failure text was recorded; the step is unchanged.
    Kept(Step),
    /// Sign-in finished and the wizard closed.
    Finished,
    /// The ticket predates a close or back; nothing changed.
    Stale,
}

/// State of the sign-in / sign-up wizard.
#[derive(Debug, Clone)]
pub struct Wizard {
    email: String,
    data: StepData,
    error: Option<String>,
    pending: Option<Ticket>,
    epoch: u64,
    open: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self {
            email: String::new(),
            data: StepData::EmailEntry,
            error: None,
            pending: None,
            epoch: 0,
            open: false,
        }
    }
}

impl Wizard {
    /// A closed wizard. Call [`open`](Self::open) to start.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.data.step()
    }

    pub fn data(&self) -> &StepData {
        &self.data
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether a submission is in flight (the submit control is disabled).
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start fresh at EmailEntry with every field empty.
    pub fn open(&mut self) {
        self.reset();
        self.open = true;
    }

    /// Discard every in-progress value. A submission still in flight becomes
    /// stale.
    pub fn close(&mut self) {
        self.reset();
    }

    /// Return to EmailEntry keeping only the email. No-op on step 1.
    pub fn back(&mut self) -> bool {
        if !self.open || self.step() == Step::EmailEntry {
            return false;
        }
        self.data = StepData::EmailEntry;
        self.error = None;
        self.pending = None;
        self.epoch += 1;
        true
    }

    /// Set a field on the current step.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> Result<(), WizardError> {
        if !self.open {
            return Err(WizardError::Closed);
        }
        let step = self.step();
        let slot = match field {
            Field::Email if step == Step::EmailEntry => &mut self.email,
            _ => self.data.slot(field).ok_or(WizardError::NoSuchField {
                step: step.to_string(),
                field: field.label(),
            })?,
        };
        *slot = value.into();
        Ok(())
    }

    /// Validate the current step and mark a submission as pending.
    ///
    /// Validation failures are recorded as the inline error and returned as
    /// `Ok(Err(_))`; wizard misuse (closed, already pending) is `Err`.
    pub fn begin_submit(
        &mut self,
    ) -> Result<Result<(Ticket, Submission), ValidationError>, WizardError> {
        if !self.open {
            return Err(WizardError::Closed);
        }
        if self.pending.is_some() {
            return Err(WizardError::SubmissionPending);
        }

        let submission = match self.validate() {
            Ok(submission) => submission,
            Err(e) => {
                self.error = Some(e.to_string());
                return Ok(Err(e));
            }
        };

        self.error = None;
        let ticket = Ticket {
            epoch: self.epoch,
            step: self.step(),
        };
        self.pending = Some(ticket);
        Ok(Ok((ticket, submission)))
    }

    /// Apply the outcome of the submission identified by `ticket`.
    pub fn complete(&mut self, ticket: Ticket, outcome: Outcome) -> Result<Completion, WizardError> {
        if !self.open || self.pending != Some(ticket) || ticket.epoch != self.epoch {
            return Ok(Completion::Stale);
        }
        self.pending = None;

        let from = ticket.step;
        let target = match (&outcome, from) {
            (Outcome::Failed(message), _) => {
                self.error = Some(message.clone());
                return Ok(Completion::Kept(from));
            }
            (Outcome::SignedIn, step) if step.is_terminal() => {
                self.reset();
                return Ok(Completion::Finished);
            }
            (Outcome::ExistingUser, _) => Step::SignIn,
            (Outcome::CodeSent, _) => Step::VerifyOtp,
            (Outcome::CodeVerified, _) => Step::Register,
            (Outcome::SignedIn, _) => from,
        };

        if !from.can_transition_to(target) {
            return Err(WizardError::InvalidTransition {
                from: from.to_string(),
                to: target.to_string(),
            });
        }
        self.data = StepData::fresh(target);
        self.epoch += 1;
        Ok(Completion::Advanced(target))
    }

    fn validate(&self) -> Result<Submission, ValidationError> {
        match &self.data {
            StepData::EmailEntry => {
                let email = self.email.trim();
                if email.is_empty() {
                    return Err(ValidationError::Required { field: "email" });
                }
                if !EMAIL_RE.is_match(email) {
                    return Err(ValidationError::InvalidEmail {
                        value: email.to_string(),
                    });
                }
                Ok(Submission::CheckEmail {
                    email: email.to_string(),
                })
            }
            StepData::SignIn { password } => {
                if password.is_empty() {
                    return Err(ValidationError::Required { field: "password" });
                }
                Ok(Submission::SignIn {
                    credentials: Credentials::new(self.email.trim(), password.as_str()),
                })
            }
            StepData::VerifyOtp { code } => {
                let code = code.trim();
                if code.is_empty() {
                    return Err(ValidationError::Required {
                        field: "verification code",
                    });
                }
                Ok(Submission::VerifyCode {
                    email: self.email.trim().to_string(),
                    code: code.to_string(),
                })
            }
            StepData::Register {
                first_name,
                last_name,
                password,
            } => {
                let missing: Vec<&'static str> = [
                    ("first name", first_name.trim().is_empty()),
                    ("last name", last_name.trim().is_empty()),
                    ("password", password.is_empty()),
                ]
                .into_iter()
                .filter_map(|(field, blank)| blank.then_some(field))
                .collect();
                if !missing.is_empty() {
                    return Err(ValidationError::MissingFields { fields: missing });
                }
                Ok(Submission::Register {
                    registration: Registration::new(
                        self.email.trim(),
                        first_name.trim(),
                        last_name.trim(),
                        password.as_str(),
                    ),
                })
            }
        }
    }

    fn reset(&mut self) {
        self.email.clear();
        self.data = StepData::EmailEntry;
        self.error = None;
        self.pending = None;
        self.epoch += 1;
        self.open = false;
    }
}
