//! Onboarding wizard — steps, draft data, validation, and navigation.
//!
//! The wizard is a linear sequence of steps over a single [`DraftStore`].
//! Validation is pure and synchronous; the [`StepController`] gates
//! navigation on it, and nothing here performs I/O. Submission of a finished
//! draft lives in [`crate::submit`].

pub mod controller;
pub mod draft;
pub mod step;
pub mod validate;

pub use controller::{StepController, WizardPosition};
pub use draft::{DraftStore, FieldValue, StepFields};
pub use step::{StepDefinition, StepId};
pub use validate::{FieldKind, FieldSchema, Rule, ValidationResult, validate_step};
