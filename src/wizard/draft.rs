//! Draft store — the single source of truth for in-progress onboarding data.
//!
//! Nothing here touches the network; a draft only leaves the client when the
//! submission orchestrator assembles it into backend requests.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, UploadError};
use crate::upload::{UploadCandidate, UploadOutcome};
use crate::wizard::step::StepId;

/// One field's value in the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Choice(String),
    Flag(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    /// Textual content, for Text and Choice values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the value counts as unfilled for `required` checks.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) | Self::Choice(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Flag(_) => false,
        }
    }
}

/// The fields entered for one step.
pub type StepFields = BTreeMap<String, FieldValue>;

/// Accumulated, not-yet-submitted onboarding data.
///
/// Mutated only from the UI task; destroyed on successful submission or
/// explicit reset. Serializable so the configured draft policy can save it
/// locally — the backend never receives a draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftStore {
    steps: BTreeMap<StepId, StepFields>,
    documents: Vec<UploadCandidate>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fields entered so far for a step, if any.
    pub fn fields(&self, step: StepId) -> Option<&StepFields> {
        self.steps.get(&step)
    }

    /// A single field value.
    pub fn field(&self, step: StepId, name: &str) -> Option<&FieldValue> {
        self.steps.get(&step).and_then(|fields| fields.get(name))
    }

    /// Set a field, overwriting any previous value (last write wins).
    ///
    /// Performs no validation — callers run the validation schema separately
    /// on every change and on navigation attempts.
    pub fn set_field(&mut self, step: StepId, name: impl Into<String>, value: FieldValue) {
        self.steps.entry(step).or_default().insert(name.into(), value);
    }

    /// Remove a field. Returns the previous value, if any.
    pub fn remove_field(&mut self, step: StepId, name: &str) -> Option<FieldValue> {
        self.steps.get_mut(&step).and_then(|fields| fields.remove(name))
    }

    /// Accepted documents attached to the draft.
    pub fn documents(&self) -> &[UploadCandidate] {
        &self.documents
    }

    /// Attach an accepted upload candidate. A candidate with the same file
    /// name replaces the earlier one; rejected candidates are refused.
    pub fn attach_document(&mut self, candidate: UploadCandidate) -> Result<(), UploadError> {
        if let UploadOutcome::Rejected(reason) = &candidate.outcome {
            return Err(UploadError::Rejected {
                file_name: candidate.file_name.clone(),
                reason: reason.clone(),
            });
        }
        self.documents.retain(|d| d.file_name != candidate.file_name);
        self.documents.push(candidate);
        Ok(())
    }

    /// Detach a document by file name. Returns true if one was removed.
    pub fn detach_document(&mut self, file_name: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.file_name != file_name);
        self.documents.len() < before
    }

    /// Whether nothing has been entered yet.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
            && self.steps.values().all(|fields| fields.is_empty())
    }

    /// Clear all accumulated data, including attached documents.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.documents.clear();
    }

    /// An independent copy of the full draft. Reflects the last value written
    /// per field; later mutations of the store do not affect the snapshot.
    pub fn snapshot(&self) -> DraftStore {
        self.clone()
    }

    /// Save the draft as JSON at `path` (for the file draft policy).
    pub async fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "draft".to_string(),
            message: e.to_string(),
        })?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Load a previously saved draft. Returns `None` if no file exists.
    pub async fn load_from(path: &Path) -> Result<Option<DraftStore>, ConfigError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let draft =
                    serde_json::from_slice(&bytes).map_err(|e| ConfigError::InvalidValue {
                        key: "draft".to_string(),
                        message: e.to_string(),
                    })?;
                Ok(Some(draft))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectReason;

    fn accepted(name: &str) -> UploadCandidate {
        UploadCandidate {
            file_name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 1024,
            path: None,
            outcome: UploadOutcome::Accepted,
        }
    }

    #[test]
    fn last_write_wins() {
        let mut draft = DraftStore::new();
        draft.set_field(StepId::CompanyInfo, "company_name", FieldValue::text("Acme"));
        draft.set_field(StepId::CompanyInfo, "company_name", FieldValue::text("Acme Ltd"));
        draft.set_field(StepId::CompanyInfo, "country", FieldValue::choice("GB"));

        let snapshot = draft.snapshot();
        assert_eq!(
            snapshot.field(StepId::CompanyInfo, "company_name"),
            Some(&FieldValue::text("Acme Ltd"))
        );
        assert_eq!(
            snapshot.field(StepId::CompanyInfo, "country"),
            Some(&FieldValue::choice("GB"))
        );
    }

    #[test]
    fn snapshot_is_independent() {
        let mut draft = DraftStore::new();
        draft.set_field(StepId::Kyc, "email", FieldValue::text("a@b.co"));
        let snapshot = draft.snapshot();

        draft.set_field(StepId::Kyc, "email", FieldValue::text("changed@b.co"));
        draft.reset();

        assert_eq!(
            snapshot.field(StepId::Kyc, "email"),
            Some(&FieldValue::text("a@b.co"))
        );
        assert!(draft.is_empty());
    }

    #[test]
    fn set_field_is_idempotent_for_same_value() {
        let mut draft = DraftStore::new();
        draft.set_field(StepId::CompanyInfo, "sector", FieldValue::choice("fintech"));
        let first = draft.snapshot();
        draft.set_field(StepId::CompanyInfo, "sector", FieldValue::choice("fintech"));
        assert_eq!(first, draft.snapshot());
    }

    #[test]
    fn attach_replaces_same_file_name() {
        let mut draft = DraftStore::new();
        draft.attach_document(accepted("deck.pdf")).unwrap();
        let mut replacement = accepted("deck.pdf");
        replacement.size_bytes = 2048;
        draft.attach_document(replacement).unwrap();

        assert_eq!(draft.documents().len(), 1);
        assert_eq!(draft.documents()[0].size_bytes, 2048);
    }

    #[test]
    fn attach_refuses_rejected_candidates() {
        let mut draft = DraftStore::new();
        let mut candidate = accepted("cap-table.docx");
        candidate.outcome = UploadOutcome::Rejected(RejectReason::UnsupportedType {
            mime: "application/msword".to_string(),
        });

        let err = draft.attach_document(candidate).unwrap_err();
        assert!(matches!(err, UploadError::Rejected { .. }));
        assert!(draft.documents().is_empty());
    }

    #[test]
    fn detach_by_name() {
        let mut draft = DraftStore::new();
        draft.attach_document(accepted("deck.pdf")).unwrap();
        draft.attach_document(accepted("financials.pdf")).unwrap();

        assert!(draft.detach_document("deck.pdf"));
        assert!(!draft.detach_document("deck.pdf"));
        assert_eq!(draft.documents().len(), 1);
    }

    #[test]
    fn reset_clears_fields_and_documents() {
        let mut draft = DraftStore::new();
        draft.set_field(StepId::Financials, "raise_target", FieldValue::Number(50_000.into()));
        draft.attach_document(accepted("deck.pdf")).unwrap();

        draft.reset();
        assert!(draft.is_empty());
        assert!(draft.fields(StepId::Financials).is_none_or(|f| f.is_empty()));
    }

    #[tokio::test]
    async fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");

        let mut draft = DraftStore::new();
        draft.set_field(StepId::CompanyInfo, "company_name", FieldValue::text("Acme"));
        draft.attach_document(accepted("deck.pdf")).unwrap();
        draft.save_to(&path).await.unwrap();

        let loaded = DraftStore::load_from(&path).await.unwrap().unwrap();
        assert_eq!(loaded, draft);

        let missing = dir.path().join("nope.json");
        assert!(DraftStore::load_from(&missing).await.unwrap().is_none());
    }
}
