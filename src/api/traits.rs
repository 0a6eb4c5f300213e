//! Backend API seam.
//!
//! One async trait covering the REST endpoints the client consumes, so the
//! orchestrator and dashboard can be driven against a mock in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::types::{
    CompanyRequest, CompanyResponse, DocumentPayload, FileUploadResponse, FinancialsRequest,
    FinancialsResponse, KycRequest, KycResponse, Notification, ScoreResponse, StoredDocument,
};
use crate::error::ApiError;

/// The capital-marketplace backend, as seen from the client.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // ── Onboarding writes (submission order) ────────────────────────

    /// POST /api/company — create or update the company profile.
    async fn create_company(&self, request: &CompanyRequest) -> Result<CompanyResponse, ApiError>;

    /// POST /api/kyc/verify — submit KYC data.
    async fn verify_kyc(&self, request: &KycRequest) -> Result<KycResponse, ApiError>;

    /// POST /api/financials/link — link a financial data source.
    async fn link_financials(
        &self,
        request: &FinancialsRequest,
    ) -> Result<FinancialsResponse, ApiError>;

    /// POST /api/files — upload one document.
    async fn upload_document(
        &self,
        company_id: Uuid,
        payload: DocumentPayload,
    ) -> Result<FileUploadResponse, ApiError>;

    // ── Dashboard reads ─────────────────────────────────────────────

    /// GET /api/files — list uploaded documents.
    async fn list_documents(&self) -> Result<Vec<StoredDocument>, ApiError>;

    /// GET /api/score — fetch the investability score.
    async fn fetch_score(&self) -> Result<ScoreResponse, ApiError>;

    /// GET /api/notifications — fetch in-app notifications.
    async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError>;
}
