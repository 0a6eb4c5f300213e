//! Step controller — gates navigation through the wizard.
//!
//! States are the step identifiers in fixed linear order plus a terminal
//! submitted state, reached only via the submission orchestrator's success
//! path.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::wizard::draft::DraftStore;
use crate::wizard::step::{StepDefinition, StepId};
use crate::wizard::validate;

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "step")]
pub enum WizardPosition {
    AtStep(StepId),
    Submitted,
}

/// Drives the user through the onboarding steps.
///
/// Holds only position; all data lives in the [`DraftStore`], which callers
/// pass in so navigation decisions always see the latest draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepController {
    position: WizardPosition,
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}

impl StepController {
    /// A controller positioned at the first step.
    pub fn new() -> Self {
        Self {
            position: WizardPosition::AtStep(StepId::CompanyInfo),
        }
    }

    pub fn position(&self) -> WizardPosition {
        self.position
    }

    /// The active step, or `None` once submitted.
    pub fn current_step(&self) -> Option<StepId> {
        match self.position {
            WizardPosition::AtStep(step) => Some(step),
            WizardPosition::Submitted => None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.position == WizardPosition::Submitted
    }

    /// Advance to the next step.
    ///
    /// Succeeds only when the active step's validation result is empty;
    /// otherwise fails with [`WizardError::ValidationBlocked`] carrying the
    /// error mapping, and the position does not change. Calling `go_next` on
    /// the last step stays put (submission is the only way out).
    pub fn go_next(&mut self, draft: &DraftStore) -> Result<StepId, WizardError> {
        let current = self.require_step()?;
        let result = validate::validate_step(current, draft);
        if !result.is_valid() {
            return Err(WizardError::ValidationBlocked {
                step: current,
                errors: result.into_errors(),
            });
        }
        let next = current.next().unwrap_or(current);
        self.position = WizardPosition::AtStep(next);
        Ok(next)
    }

    /// Go back one step. Always succeeds going backward and never discards
    /// entered data; on the first step it stays put.
    pub fn go_back(&mut self) -> Result<StepId, WizardError> {
        let current = self.require_step()?;
        let prev = current.prev().unwrap_or(current);
        self.position = WizardPosition::AtStep(prev);
        Ok(prev)
    }

    /// Jump directly to a step.
    ///
    /// Permitted only when every predecessor of `target` is complete;
    /// otherwise fails with [`WizardError::StepLocked`] naming the first
    /// incomplete predecessor. Jumping backward is always within that rule,
    /// since a step's predecessors don't include itself.
    pub fn go_to(&mut self, target: StepId, draft: &DraftStore) -> Result<StepId, WizardError> {
        self.require_step()?;
        for predecessor in target.predecessors() {
            if !StepDefinition::for_step(*predecessor).is_complete(draft) {
                return Err(WizardError::StepLocked {
                    step: target,
                    first_incomplete: *predecessor,
                });
            }
        }
        self.position = WizardPosition::AtStep(target);
        Ok(target)
    }

    /// Enter the terminal submitted state. Called by the submission flow
    /// after the orchestrator reports full success; afterwards all
    /// navigation fails.
    pub fn mark_submitted(&mut self) {
        self.position = WizardPosition::Submitted;
    }

    fn require_step(&self) -> Result<StepId, WizardError> {
        self.current_step().ok_or(WizardError::AlreadySubmitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{UploadCandidate, UploadOutcome};
    use crate::wizard::draft::FieldValue;
    use rust_decimal_macros::dec;

    fn complete_draft() -> DraftStore {
        let mut draft = DraftStore::new();
        draft.set_field(StepId::CompanyInfo, "company_name", FieldValue::text("Acme Ltd"));
        draft.set_field(
            StepId::CompanyInfo,
            "registration_number",
            FieldValue::text("GB-1234567"),
        );
        draft.set_field(
            StepId::CompanyInfo,
            "incorporation_date",
            FieldValue::text("2021-04-12"),
        );
        draft.set_field(StepId::CompanyInfo, "country", FieldValue::choice("GB"));
        draft.set_field(StepId::CompanyInfo, "sector", FieldValue::choice("fintech"));

        draft.set_field(StepId::Kyc, "legal_first_name", FieldValue::text("Ada"));
        draft.set_field(StepId::Kyc, "legal_last_name", FieldValue::text("Lovelace"));
        draft.set_field(StepId::Kyc, "email", FieldValue::text("ada@acme.example"));
        draft.set_field(StepId::Kyc, "id_document_number", FieldValue::text("P1234567"));
        draft.set_field(StepId::Kyc, "role", FieldValue::choice("founder"));
        draft.set_field(StepId::Kyc, "ownership_percent", FieldValue::Number(dec!(62.5)));

        draft.set_field(StepId::Financials, "provider", FieldValue::choice("manual"));
        draft.set_field(
            StepId::Financials,
            "equity_offered_percent",
            FieldValue::Number(dec!(12.5)),
        );
        draft.set_field(StepId::Financials, "raise_target", FieldValue::Number(dec!(500000)));

        draft
            .attach_document(UploadCandidate {
                file_name: "deck.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                size_bytes: 2 * 1024 * 1024,
                path: None,
                outcome: UploadOutcome::Accepted,
            })
            .unwrap();

        draft
    }

    #[test]
    fn starts_at_company_info() {
        let controller = StepController::new();
        assert_eq!(controller.current_step(), Some(StepId::CompanyInfo));
        assert!(!controller.is_submitted());
    }

    #[test]
    fn go_next_blocked_by_validation_errors() {
        let mut controller = StepController::new();
        let mut draft = DraftStore::new();
        draft.set_field(StepId::CompanyInfo, "company_name", FieldValue::text("Acme Ltd"));

        let err = controller.go_next(&draft).unwrap_err();
        match err {
            WizardError::ValidationBlocked { step, errors } => {
                assert_eq!(step, StepId::CompanyInfo);
                assert_eq!(errors.get("incorporation_date").map(String::as_str), Some("required"));
            }
            other => panic!("expected ValidationBlocked, got {other:?}"),
        }
        // Position unchanged
        assert_eq!(controller.current_step(), Some(StepId::CompanyInfo));
    }

    #[test]
    fn go_next_walks_a_complete_draft() {
        let mut controller = StepController::new();
        let draft = complete_draft();

        assert_eq!(controller.go_next(&draft).unwrap(), StepId::Kyc);
        assert_eq!(controller.go_next(&draft).unwrap(), StepId::Financials);
        assert_eq!(controller.go_next(&draft).unwrap(), StepId::Documents);
        assert_eq!(controller.go_next(&draft).unwrap(), StepId::Review);
        // Review is the end of the line; go_next stays put
        assert_eq!(controller.go_next(&draft).unwrap(), StepId::Review);
    }

    #[test]
    fn go_back_always_succeeds_and_keeps_data() {
        let mut controller = StepController::new();
        let mut draft = complete_draft();

        controller.go_next(&draft).unwrap();
        draft.set_field(StepId::Kyc, "email", FieldValue::text("broken"));

        // Back from an invalid step works, and the data stays
        assert_eq!(controller.go_back().unwrap(), StepId::CompanyInfo);
        assert_eq!(
            draft.field(StepId::Kyc, "email"),
            Some(&FieldValue::text("broken"))
        );

        // On the first step, back stays put
        assert_eq!(controller.go_back().unwrap(), StepId::CompanyInfo);
    }

    #[test]
    fn go_to_locked_when_predecessor_incomplete() {
        let mut controller = StepController::new();
        let mut draft = complete_draft();
        // Break the KYC step
        draft.remove_field(StepId::Kyc, "email");

        let err = controller.go_to(StepId::Documents, &draft).unwrap_err();
        match err {
            WizardError::StepLocked { step, first_incomplete } => {
                assert_eq!(step, StepId::Documents);
                assert_eq!(first_incomplete, StepId::Kyc);
            }
            other => panic!("expected StepLocked, got {other:?}"),
        }
        assert_eq!(controller.current_step(), Some(StepId::CompanyInfo));
    }

    #[test]
    fn go_to_allows_jump_over_complete_steps() {
        let mut controller = StepController::new();
        let draft = complete_draft();

        assert_eq!(controller.go_to(StepId::Review, &draft).unwrap(), StepId::Review);
        // Jumping backward is always allowed
        assert_eq!(
            controller.go_to(StepId::CompanyInfo, &draft).unwrap(),
            StepId::CompanyInfo
        );
    }

    #[test]
    fn submitted_is_terminal() {
        let mut controller = StepController::new();
        let draft = complete_draft();

        controller.mark_submitted();
        assert!(controller.is_submitted());
        assert_eq!(controller.current_step(), None);
        assert!(matches!(
            controller.go_next(&draft),
            Err(WizardError::AlreadySubmitted)
        ));
        assert!(matches!(controller.go_back(), Err(WizardError::AlreadySubmitted)));
        assert!(matches!(
            controller.go_to(StepId::Kyc, &draft),
            Err(WizardError::AlreadySubmitted)
        ));
    }
}
