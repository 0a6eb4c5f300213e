//! Onboarding step identifiers and definitions.

use serde::{Deserialize, Serialize};

use crate::wizard::draft::DraftStore;
use crate::wizard::validate::{self, FieldSchema};

/// The steps of the onboarding wizard.
///
/// Fixed linear order: CompanyInfo → Kyc → Financials → Documents → Review.
/// The terminal submitted position is held by the controller, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    CompanyInfo,
    Kyc,
    Financials,
    Documents,
    Review,
}

impl StepId {
    /// All steps in wizard order.
    pub const ALL: [StepId; 5] = [
        Self::CompanyInfo,
        Self::Kyc,
        Self::Financials,
        Self::Documents,
        Self::Review,
    ];

    /// Position of this step in the wizard order.
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// The next step in the linear progression, if any.
    pub fn next(&self) -> Option<StepId> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The previous step, if any.
    pub fn prev(&self) -> Option<StepId> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Steps strictly before this one, in order.
    pub fn predecessors(&self) -> &'static [StepId] {
        static ORDER: [StepId; 5] = StepId::ALL;
        &ORDER[..self.index()]
    }

    /// Parse a kebab-case step identifier, e.g. `company-info`.
    pub fn parse(s: &str) -> Option<StepId> {
        match s {
            "company-info" => Some(Self::CompanyInfo),
            "kyc" => Some(Self::Kyc),
            "financials" => Some(Self::Financials),
            "documents" => Some(Self::Documents),
            "review" => Some(Self::Review),
            _ => None,
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CompanyInfo => "company-info",
            Self::Kyc => "kyc",
            Self::Financials => "financials",
            Self::Documents => "documents",
            Self::Review => "review",
        };
        write!(f, "{s}")
    }
}

/// Static definition of one wizard step: its field schemas and the predicate
/// deciding whether the step can be left.
#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub id: StepId,
    pub title: &'static str,
    pub fields: &'static [FieldSchema],
}

impl StepDefinition {
    /// Look up the definition for a step.
    pub fn for_step(id: StepId) -> &'static StepDefinition {
        &DEFINITIONS[id.index()]
    }

    /// Whether the step is complete against the current draft.
    ///
    /// Review is complete iff every prior step is; all other steps are
    /// complete when their validation result is empty.
    pub fn is_complete(&self, draft: &DraftStore) -> bool {
        match self.id {
            StepId::Review => StepId::Review
                .predecessors()
                .iter()
                .all(|s| StepDefinition::for_step(*s).is_complete(draft)),
            _ => validate::validate_step(self.id, draft).is_valid(),
        }
    }
}

static DEFINITIONS: [StepDefinition; 5] = [
    StepDefinition {
        id: StepId::CompanyInfo,
        title: "Company information",
        fields: validate::COMPANY_INFO_FIELDS,
    },
    StepDefinition {
        id: StepId::Kyc,
        title: "Founder verification",
        fields: validate::KYC_FIELDS,
    },
    StepDefinition {
        id: StepId::Financials,
        title: "Financials & raise terms",
        fields: validate::FINANCIALS_FIELDS,
    },
    StepDefinition {
        id: StepId::Documents,
        title: "Supporting documents",
        fields: &[],
    },
    StepDefinition {
        id: StepId::Review,
        title: "Review & submit",
        fields: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_all_steps() {
        let expected = [
            StepId::Kyc,
            StepId::Financials,
            StepId::Documents,
            StepId::Review,
        ];
        let mut current = StepId::CompanyInfo;
        for expected_next in expected {
            let next = current.next().unwrap();
            assert_eq!(next, expected_next);
            current = next;
        }
        assert!(current.next().is_none());
    }

    #[test]
    fn prev_mirrors_next() {
        for step in StepId::ALL {
            if let Some(next) = step.next() {
                assert_eq!(next.prev(), Some(step));
            }
        }
        assert!(StepId::CompanyInfo.prev().is_none());
    }

    #[test]
    fn predecessors_are_in_order() {
        assert!(StepId::CompanyInfo.predecessors().is_empty());
        assert_eq!(
            StepId::Financials.predecessors(),
            &[StepId::CompanyInfo, StepId::Kyc]
        );
        assert_eq!(StepId::Review.predecessors().len(), 4);
    }

    #[test]
    fn display_matches_serde() {
        for step in StepId::ALL {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            // JSON wraps in quotes
            assert_eq!(
                format!("\"{display}\""),
                json,
                "Display and serde should match for {step:?}"
            );
        }
    }

    #[test]
    fn parse_roundtrips_display() {
        for step in StepId::ALL {
            assert_eq!(StepId::parse(&step.to_string()), Some(step));
        }
        assert!(StepId::parse("not-a-step").is_none());
    }

    #[test]
    fn definitions_cover_all_steps_in_order() {
        for step in StepId::ALL {
            assert_eq!(StepDefinition::for_step(step).id, step);
        }
    }
}
