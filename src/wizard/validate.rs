//! Declarative per-step validation.
//!
//! Validation is pure and synchronous: it classifies the draft without I/O,
//! so callers can run it on every field change and navigation attempt.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::wizard::draft::{DraftStore, FieldValue, StepFields};
use crate::wizard::step::StepId;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static COUNTRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());
static REGISTRATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{4,20}$").unwrap());
static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://\S+$").unwrap());

/// What kind of value a field holds. Drives input parsing and which rules
/// apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Choice,
    Date,
}

/// One field's declarative schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub rules: &'static [Rule],
}

/// A single declarative rule. Rules run in order; the first failure becomes
/// the field's error message.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// String length bounds (chars).
    Length { min: usize, max: usize },
    /// Numeric lower bound, inclusive.
    Min(Decimal),
    /// Numeric upper bound, inclusive.
    Max(Decimal),
    /// Strictly greater than zero.
    Positive,
    /// Enumerated membership.
    OneOf(&'static [&'static str]),
    /// Regex format check with a human-readable hint.
    Pattern {
        pattern: &'static LazyLock<Regex>,
        hint: &'static str,
    },
    /// ISO date that must not lie in the future.
    PastOrPresentDate,
}

/// Per-field error messages for one step. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }

    /// Record an error for a field, keeping an earlier message if one exists.
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }
}

pub static COMPANY_INFO_FIELDS: &[FieldSchema] = &[
    FieldSchema {
        name: "company_name",
        label: "Company name",
        kind: FieldKind::Text,
        required: true,
        rules: &[Rule::Length { min: 2, max: 120 }],
    },
    FieldSchema {
        name: "registration_number",
        label: "Registration number",
        kind: FieldKind::Text,
        required: true,
        rules: &[Rule::Pattern {
            pattern: &REGISTRATION_RE,
            hint: "4-20 letters, digits or dashes",
        }],
    },
    FieldSchema {
        name: "incorporation_date",
        label: "Incorporation date",
        kind: FieldKind::Date,
        required: true,
        rules: &[Rule::PastOrPresentDate],
    },
    FieldSchema {
        name: "country",
        label: "Country",
        kind: FieldKind::Choice,
        required: true,
        rules: &[Rule::Pattern {
            pattern: &COUNTRY_RE,
            hint: "a two-letter country code",
        }],
    },
    FieldSchema {
        name: "sector",
        label: "Sector",
        kind: FieldKind::Choice,
        required: true,
        rules: &[Rule::OneOf(&[
            "fintech",
            "healthtech",
            "climate",
            "saas",
            "marketplace",
            "deeptech",
            "consumer",
            "other",
        ])],
    },
    FieldSchema {
        name: "website",
        label: "Website",
        kind: FieldKind::Text,
        required: false,
        rules: &[Rule::Pattern {
            pattern: &WEBSITE_RE,
            hint: "an http(s) URL",
        }],
    },
];

pub static KYC_FIELDS: &[FieldSchema] = &[
    FieldSchema {
        name: "legal_first_name",
        label: "Legal first name",
        kind: FieldKind::Text,
        required: true,
        rules: &[Rule::Length { min: 1, max: 80 }],
    },
    FieldSchema {
        name: "legal_last_name",
        label: "Legal last name",
        kind: FieldKind::Text,
        required: true,
        rules: &[Rule::Length { min: 1, max: 80 }],
    },
    FieldSchema {
        name: "email",
        label: "Email",
        kind: FieldKind::Text,
        required: true,
        rules: &[Rule::Pattern {
            pattern: &EMAIL_RE,
            hint: "an email address",
        }],
    },
    FieldSchema {
        name: "id_document_number",
        label: "ID document number",
        kind: FieldKind::Text,
        required: true,
        rules: &[Rule::Length { min: 4, max: 40 }],
    },
    FieldSchema {
        name: "role",
        label: "Role",
        kind: FieldKind::Choice,
        required: true,
        rules: &[Rule::OneOf(&["founder", "director", "officer"])],
    },
    FieldSchema {
        name: "ownership_percent",
        label: "Ownership %",
        kind: FieldKind::Number,
        required: true,
        rules: &[Rule::Min(dec!(0)), Rule::Max(dec!(100))],
    },
];

pub static FINANCIALS_FIELDS: &[FieldSchema] = &[
    FieldSchema {
        name: "provider",
        label: "Data provider",
        kind: FieldKind::Choice,
        required: true,
        rules: &[Rule::OneOf(&["open-banking", "accounting-api", "manual"])],
    },
    FieldSchema {
        name: "account_reference",
        label: "Account reference",
        // Required unless provider is manual — enforced as a cross-field
        // check below.
        kind: FieldKind::Text,
        required: false,
        rules: &[Rule::Length { min: 4, max: 64 }],
    },
    FieldSchema {
        name: "annual_revenue",
        label: "Annual revenue",
        kind: FieldKind::Number,
        required: false,
        rules: &[Rule::Min(dec!(0))],
    },
    FieldSchema {
        name: "equity_offered_percent",
        label: "Equity offered %",
        kind: FieldKind::Number,
        required: true,
        rules: &[Rule::Positive, Rule::Max(dec!(100))],
    },
    FieldSchema {
        name: "raise_target",
        label: "Raise target",
        kind: FieldKind::Number,
        required: true,
        rules: &[Rule::Positive],
    },
    FieldSchema {
        name: "minimum_ticket",
        label: "Minimum ticket",
        kind: FieldKind::Number,
        required: false,
        rules: &[Rule::Positive],
    },
];

/// Validate one step of the draft.
///
/// Recomputed on every field change and navigation attempt; an empty result
/// means the step can be left.
pub fn validate_step(step: StepId, draft: &DraftStore) -> ValidationResult {
    let mut result = ValidationResult::default();

    match step {
        StepId::Documents => {
            if draft.documents().is_empty() {
                result.push("documents", "at least one document is required");
            }
        }
        StepId::Review => {
            // Review has no fields of its own; completeness of prior steps
            // is the controller's concern.
        }
        _ => {
            static EMPTY: StepFields = StepFields::new();
            let fields = draft.fields(step).unwrap_or(&EMPTY);
            let schemas = match step {
                StepId::CompanyInfo => COMPANY_INFO_FIELDS,
                StepId::Kyc => KYC_FIELDS,
                StepId::Financials => FINANCIALS_FIELDS,
                StepId::Documents | StepId::Review => &[],
            };
            for schema in schemas {
                if let Some(message) = check_field(schema, fields.get(schema.name)) {
                    result.push(schema.name, message);
                }
            }
            cross_checks(step, fields, &mut result);
        }
    }

    result
}

/// Run one field's rules. Returns the first failure message, if any.
fn check_field(schema: &FieldSchema, value: Option<&FieldValue>) -> Option<String> {
    let value = match value {
        Some(v) if !v.is_blank() => v,
        _ => {
            return schema.required.then(|| "required".to_string());
        }
    };

    for rule in schema.rules {
        if let Some(message) = check_rule(schema, rule, value) {
            return Some(message);
        }
    }
    None
}

fn check_rule(schema: &FieldSchema, rule: &Rule, value: &FieldValue) -> Option<String> {
    match rule {
        Rule::Length { min, max } => {
            let text = value.as_text()?;
            let len = text.chars().count();
            if len < *min {
                Some(format!("must be at least {min} characters"))
            } else if len > *max {
                Some(format!("must be at most {max} characters"))
            } else {
                None
            }
        }
        Rule::Min(min) => match value.as_number() {
            Some(n) if n < *min => Some(format!("must be at least {min}")),
            Some(_) => None,
            None => Some("must be a number".to_string()),
        },
        Rule::Max(max) => match value.as_number() {
            Some(n) if n > *max => Some(format!("must not exceed {max}")),
            Some(_) => None,
            None => Some("must be a number".to_string()),
        },
        Rule::Positive => match value.as_number() {
            Some(n) if n <= Decimal::ZERO => Some("must be greater than zero".to_string()),
            Some(_) => None,
            None => Some("must be a number".to_string()),
        },
        Rule::OneOf(options) => {
            let text = value.as_text()?;
            if options.contains(&text) {
                None
            } else {
                Some(format!("must be one of: {}", options.join(", ")))
            }
        }
        Rule::Pattern { pattern, hint } => {
            let text = value.as_text()?;
            if pattern.is_match(text) {
                None
            } else {
                Some(format!("must be {hint}"))
            }
        }
        Rule::PastOrPresentDate => {
            let text = match value.as_text() {
                Some(t) => t,
                None => return Some("must be an ISO date (YYYY-MM-DD)".to_string()),
            };
            match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                Ok(date) if date > Utc::now().date_naive() => {
                    Some(format!("{} must not be in the future", schema.label))
                }
                Ok(_) => None,
                Err(_) => Some("must be an ISO date (YYYY-MM-DD)".to_string()),
            }
        }
    }
}

/// Cross-field consistency checks that single-field rules cannot express.
fn cross_checks(step: StepId, fields: &StepFields, result: &mut ValidationResult) {
    if step != StepId::Financials {
        return;
    }

    let provider = fields.get("provider").and_then(|v| v.as_text());
    let account_blank = fields
        .get("account_reference")
        .is_none_or(FieldValue::is_blank);
    if matches!(provider, Some(p) if p != "manual") && account_blank {
        result.push("account_reference", "required");
    }

    let minimum = fields.get("minimum_ticket").and_then(FieldValue::as_number);
    let target = fields.get("raise_target").and_then(FieldValue::as_number);
    if let (Some(minimum), Some(target)) = (minimum, target) {
        if minimum > target {
            result.push("minimum_ticket", "must not exceed the raise target");
        }
    }
}
