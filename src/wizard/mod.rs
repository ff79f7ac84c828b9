//! Sign-in / sign-up wizard: email entry, then either password sign-in or
//! code verification followed by registration.

pub mod modal;
pub mod state;

pub use modal::{AuthModal, SubmitReport, WizardView};
pub use state::{Completion, Field, Outcome, Step, StepData, Submission, Ticket, Wizard};
