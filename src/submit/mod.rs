//! Submission orchestrator — turns a finished draft into the ordered
//! backend calls.
//!
//! Stages run strictly in dependency order: company → kyc → financials →
//! documents. A stage failure stops the sequence and is reported alongside
//! what already succeeded, so a retry resumes from the failed stage instead
//! of duplicating remote side effects. Document uploads within the final
//! stage run concurrently under a configurable cap.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::api::BackendApi;
use crate::api::types::{
    CompanyRequest, DocumentPayload, FinancialsRequest, KycRequest,
};
use crate::config::OnboardConfig;
use crate::error::{ApiError, Result, WizardError};
use crate::upload::UploadCandidate;
use crate::wizard::draft::{DraftStore, FieldValue};
use crate::wizard::step::StepId;
use crate::wizard::validate;

/// The ordered backend stages of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitStage {
    Company,
    Kyc,
    Financials,
    Documents,
}

impl std::fmt::Display for SubmitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Company => "company",
            Self::Kyc => "kyc",
            Self::Financials => "financials",
            Self::Documents => "documents",
        };
        write!(f, "{s}")
    }
}

/// Remote progress carried across submission attempts.
///
/// Holding on to this between retries is what makes re-submission safe: a
/// stage recorded here is skipped outright, and the company id from stage
/// one rides along on every later call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionCheckpoint {
    /// Idempotency key minted on the first attempt and reused on retries.
    pub idempotency_key: Option<Uuid>,
    /// Company id returned by the company stage.
    pub company_id: Option<Uuid>,
    pub kyc_verified: bool,
    pub financials_linked: bool,
    /// File names already uploaded successfully.
    pub uploaded_files: BTreeSet<String>,
    pub attempts: u32,
}

impl SubmissionCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sequential stage already succeeded on an earlier attempt.
    fn stage_done(&self, stage: SubmitStage) -> bool {
        match stage {
            SubmitStage::Company => self.company_id.is_some(),
            SubmitStage::Kyc => self.kyc_verified,
            SubmitStage::Financials => self.financials_linked,
            // Documents are tracked per file, never as a whole stage.
            SubmitStage::Documents => false,
        }
    }
}

/// Why one document failed during the documents stage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentFailure {
    #[error("could not read file: {0}")]
    Read(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Per-file result of the documents stage.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutcome {
    pub file_name: String,
    /// The backend file id on success.
    pub result: std::result::Result<Uuid, DocumentFailure>,
}

/// Overall outcome of one submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Every stage completed.
    Complete,
    /// `failed_at` failed; later stages were not attempted.
    Failed { failed_at: SubmitStage },
    /// The attempt was aborted; nothing after the abort was applied.
    Cancelled { during: SubmitStage },
}

/// What one call to [`SubmissionOrchestrator::submit`] did.
///
/// `succeeded` lists the stages complete by the end of the attempt,
/// including ones already checkpointed from earlier attempts. For a failure
/// in a sequential stage, `error` carries the backend error; a documents
/// failure is detailed per file in `documents`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub outcome: SubmissionOutcome,
    pub succeeded: Vec<SubmitStage>,
    pub documents: Vec<DocumentOutcome>,
    pub error: Option<ApiError>,
}

impl SubmissionReport {
    pub fn is_complete(&self) -> bool {
        self.outcome == SubmissionOutcome::Complete
    }

    fn failed(stage: SubmitStage, succeeded: Vec<SubmitStage>, error: ApiError) -> Self {
        Self {
            outcome: SubmissionOutcome::Failed { failed_at: stage },
            succeeded,
            documents: Vec::new(),
            error: Some(error),
        }
    }

    fn cancelled(stage: SubmitStage, succeeded: Vec<SubmitStage>) -> Self {
        Self {
            outcome: SubmissionOutcome::Cancelled { during: stage },
            succeeded,
            documents: Vec::new(),
            error: None,
        }
    }
}

/// Cancels an in-flight submission. Cloneable; safe to call more than once.
#[derive(Clone)]
pub struct SubmissionAbort(Arc<watch::Sender<bool>>);

impl SubmissionAbort {
    pub fn abort(&self) {
        let _ = self.0.send(true);
    }
}

enum Raced<T> {
    Done(T),
    Cancelled,
}

/// Sequences the backend calls for one draft.
pub struct SubmissionOrchestrator {
    api: Arc<dyn BackendApi>,
    max_concurrent_uploads: usize,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl SubmissionOrchestrator {
    pub fn new(api: Arc<dyn BackendApi>, config: &OnboardConfig) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            api,
            max_concurrent_uploads: config.max_concurrent_uploads.max(1),
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        }
    }

    /// A handle that aborts the current attempt when triggered.
    pub fn abort_handle(&self) -> SubmissionAbort {
        SubmissionAbort(Arc::clone(&self.cancel_tx))
    }

    /// Run the ordered submission for a draft snapshot.
    ///
    /// Fails fast with [`WizardError::ValidationBlocked`] if any data step is
    /// invalid — nothing leaves the client for an incomplete draft. Backend
    /// failures are not errors here; they come back inside the report.
    pub async fn submit(
        &self,
        draft: &DraftStore,
        checkpoint: &mut SubmissionCheckpoint,
    ) -> Result<SubmissionReport> {
        let plan = SubmissionPlan::assemble(draft)?;

        // Re-arm the cancel flag; an abort from a previous attempt must not
        // kill this one.
        self.cancel_tx.send_replace(false);
        checkpoint.attempts += 1;
        let idempotency_key = *checkpoint.idempotency_key.get_or_insert_with(Uuid::new_v4);

        tracing::info!(
            attempt = checkpoint.attempts,
            resuming = checkpoint.company_id.is_some(),
            documents = plan.documents.len(),
            "Starting submission"
        );

        let mut succeeded = Vec::new();

        // ── Stage 1: company ────────────────────────────────────────
        let company_id = match checkpoint.company_id {
            Some(id) => {
                succeeded.push(SubmitStage::Company);
                id
            }
            None => {
                let mut request = plan.company.clone();
                request.client_reference = Some(idempotency_key);
                match self.race(self.api.create_company(&request)).await {
                    Raced::Done(Ok(response)) => {
                        checkpoint.company_id = Some(response.company_id);
                        succeeded.push(SubmitStage::Company);
                        response.company_id
                    }
                    Raced::Done(Err(e)) => {
                        tracing::warn!(stage = %SubmitStage::Company, error = %e, "Stage failed");
                        return Ok(SubmissionReport::failed(SubmitStage::Company, succeeded, e));
                    }
                    Raced::Cancelled => {
                        return Ok(SubmissionReport::cancelled(SubmitStage::Company, succeeded));
                    }
                }
            }
        };

        // ── Stage 2: KYC ────────────────────────────────────────────
        if checkpoint.stage_done(SubmitStage::Kyc) {
            succeeded.push(SubmitStage::Kyc);
        } else {
            let mut request = plan.kyc.clone();
            request.company_id = Some(company_id);
            match self.race(self.api.verify_kyc(&request)).await {
                Raced::Done(Ok(_)) => {
                    checkpoint.kyc_verified = true;
                    succeeded.push(SubmitStage::Kyc);
                }
                Raced::Done(Err(e)) => {
                    tracing::warn!(stage = %SubmitStage::Kyc, error = %e, "Stage failed");
                    return Ok(SubmissionReport::failed(SubmitStage::Kyc, succeeded, e));
                }
                Raced::Cancelled => {
                    return Ok(SubmissionReport::cancelled(SubmitStage::Kyc, succeeded));
                }
            }
        }

        // ── Stage 3: financials ─────────────────────────────────────
        if checkpoint.stage_done(SubmitStage::Financials) {
            succeeded.push(SubmitStage::Financials);
        } else {
            let mut request = plan.financials.clone();
            request.company_id = Some(company_id);
            match self.race(self.api.link_financials(&request)).await {
                Raced::Done(Ok(_)) => {
                    checkpoint.financials_linked = true;
                    succeeded.push(SubmitStage::Financials);
                }
                Raced::Done(Err(e)) => {
                    tracing::warn!(stage = %SubmitStage::Financials, error = %e, "Stage failed");
                    return Ok(SubmissionReport::failed(SubmitStage::Financials, succeeded, e));
                }
                Raced::Cancelled => {
                    return Ok(SubmissionReport::cancelled(SubmitStage::Financials, succeeded));
                }
            }
        }

        // ── Stage 4: documents, concurrent under the cap ────────────
        let pending: Vec<UploadCandidate> = plan
            .documents
            .iter()
            .filter(|d| !checkpoint.uploaded_files.contains(&d.file_name))
            .cloned()
            .collect();

        let mut outcomes: Vec<DocumentOutcome> = Vec::new();
        if !pending.is_empty() {
            let api = &self.api;
            let mut uploads = futures::stream::iter(pending.into_iter().map(|doc| {
                let api = Arc::clone(api);
                async move {
                    let outcome = upload_one(api.as_ref(), company_id, &doc).await;
                    (doc.file_name.clone(), outcome)
                }
            }))
            .buffer_unordered(self.max_concurrent_uploads);

            let mut cancel = self.cancel_rx.clone();
            loop {
                tokio::select! {
                    next = uploads.next() => match next {
                        Some((file_name, result)) => {
                            if result.is_ok() {
                                checkpoint.uploaded_files.insert(file_name.clone());
                            }
                            outcomes.push(DocumentOutcome { file_name, result });
                        }
                        None => break,
                    },
                    _ = cancel.wait_for(|cancelled| *cancelled) => {
                        let mut report =
                            SubmissionReport::cancelled(SubmitStage::Documents, succeeded);
                        report.documents = outcomes;
                        return Ok(report);
                    }
                }
            }
        }

        let failed_files = outcomes.iter().filter(|o| o.result.is_err()).count();
        if failed_files > 0 {
            tracing::warn!(failed_files, "Documents stage incomplete");
            return Ok(SubmissionReport {
                outcome: SubmissionOutcome::Failed {
                    failed_at: SubmitStage::Documents,
                },
                succeeded,
                documents: outcomes,
                error: None,
            });
        }

        succeeded.push(SubmitStage::Documents);
        tracing::info!(attempt = checkpoint.attempts, "Submission complete");
        Ok(SubmissionReport {
            outcome: SubmissionOutcome::Complete,
            succeeded,
            documents: outcomes,
            error: None,
        })
    }

    /// Race a backend call against the cancel signal.
    async fn race<T>(&self, call: impl Future<Output = T>) -> Raced<T> {
        let mut cancel = self.cancel_rx.clone();
        tokio::select! {
            result = call => Raced::Done(result),
            _ = cancel.wait_for(|cancelled| *cancelled) => Raced::Cancelled,
        }
    }
}

/// Upload one document: read its bytes, then transfer.
async fn upload_one(
    api: &dyn BackendApi,
    company_id: Uuid,
    doc: &UploadCandidate,
) -> std::result::Result<Uuid, DocumentFailure> {
    let bytes = match &doc.path {
        Some(path) => tokio::fs::read(path)
            .await
            .map_err(|e| DocumentFailure::Read(e.to_string()))?,
        None => Vec::new(),
    };
    let payload = DocumentPayload {
        file_name: doc.file_name.clone(),
        content_type: doc.mime_type.clone(),
        bytes,
    };
    let response = api.upload_document(company_id, payload).await?;
    Ok(response.file_id)
}

/// The typed requests assembled from a complete draft.
#[derive(Debug)]
struct SubmissionPlan {
    company: CompanyRequest,
    kyc: KycRequest,
    financials: FinancialsRequest,
    documents: Vec<UploadCandidate>,
}

impl SubmissionPlan {
    /// Validate every data step, then extract the typed requests.
    fn assemble(draft: &DraftStore) -> Result<Self> {
        for step in [
            StepId::CompanyInfo,
            StepId::Kyc,
            StepId::Financials,
            StepId::Documents,
        ] {
            let result = validate::validate_step(step, draft);
            if !result.is_valid() {
                return Err(WizardError::ValidationBlocked {
                    step,
                    errors: result.into_errors(),
                }
                .into());
            }
        }

        let company = CompanyRequest {
            client_reference: None,
            company_name: text(draft, StepId::CompanyInfo, "company_name")?,
            registration_number: text(draft, StepId::CompanyInfo, "registration_number")?,
            incorporation_date: date(draft, StepId::CompanyInfo, "incorporation_date")?,
            country: text(draft, StepId::CompanyInfo, "country")?,
            sector: text(draft, StepId::CompanyInfo, "sector")?,
            website: opt_text(draft, StepId::CompanyInfo, "website"),
        };

        let kyc = KycRequest {
            company_id: None,
            legal_first_name: text(draft, StepId::Kyc, "legal_first_name")?,
            legal_last_name: text(draft, StepId::Kyc, "legal_last_name")?,
            email: text(draft, StepId::Kyc, "email")?,
            id_document_number: text(draft, StepId::Kyc, "id_document_number")?,
            role: text(draft, StepId::Kyc, "role")?,
            ownership_percent: number(draft, StepId::Kyc, "ownership_percent")?,
        };

        let financials = FinancialsRequest {
            company_id: None,
            provider: text(draft, StepId::Financials, "provider")?,
            account_reference: opt_text(draft, StepId::Financials, "account_reference"),
            annual_revenue: opt_number(draft, StepId::Financials, "annual_revenue"),
            equity_offered_percent: number(draft, StepId::Financials, "equity_offered_percent")?,
            raise_target: number(draft, StepId::Financials, "raise_target")?,
            minimum_ticket: opt_number(draft, StepId::Financials, "minimum_ticket"),
        };

        Ok(Self {
            company,
            kyc,
            financials,
            documents: draft.documents().to_vec(),
        })
    }
}

// ── Draft extraction helpers ────────────────────────────────────────
// The draft was validated just above, so these only fail on a malformed
// store; they still propagate rather than panic.

fn text(draft: &DraftStore, step: StepId, name: &str) -> Result<String> {
    draft
        .field(step, name)
        .and_then(FieldValue::as_text)
        .map(str::to_string)
        .ok_or_else(|| invalid(step, name))
}

fn opt_text(draft: &DraftStore, step: StepId, name: &str) -> Option<String> {
    draft
        .field(step, name)
        .filter(|v| !v.is_blank())
        .and_then(FieldValue::as_text)
        .map(str::to_string)
}

fn number(draft: &DraftStore, step: StepId, name: &str) -> Result<rust_decimal::Decimal> {
    draft
        .field(step, name)
        .and_then(FieldValue::as_number)
        .ok_or_else(|| invalid(step, name))
}

fn opt_number(draft: &DraftStore, step: StepId, name: &str) -> Option<rust_decimal::Decimal> {
    draft.field(step, name).and_then(FieldValue::as_number)
}

fn date(draft: &DraftStore, step: StepId, name: &str) -> Result<chrono::NaiveDate> {
    draft
        .field(step, name)
        .and_then(FieldValue::as_text)
        .and_then(|t| chrono::NaiveDate::parse_from_str(t, "%Y-%m-%d").ok())
        .ok_or_else(|| invalid(step, name))
}

fn invalid(step: StepId, name: &str) -> crate::error::Error {
    WizardError::InvalidDraftField {
        step,
        field: name.to_string(),
    }
    .into()
}
