//! Request and response bodies for the backend REST API.
//!
//! The backend speaks camelCase JSON; everything here is a plain serde DTO
//! with no behavior beyond construction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /api/company — create or update the company profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequest {
    /// Client-generated idempotency key, stable across retries of the same
    /// submission so the backend can deduplicate creates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_reference: Option<Uuid>,
    pub company_name: String,
    pub registration_number: String,
    pub incorporation_date: NaiveDate,
    pub country: String,
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub company_id: Uuid,
}

/// POST /api/kyc/verify — submit the founder's verification data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRequest {
    /// Set by the orchestrator once the company stage has succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    pub legal_first_name: String,
    pub legal_last_name: String,
    pub email: String,
    pub id_document_number: String,
    pub role: String,
    pub ownership_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycResponse {
    pub verification_id: Uuid,
    pub status: String,
}

/// POST /api/financials/link — link a financial data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<Decimal>,
    pub equity_offered_percent: Decimal,
    pub raise_target: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_ticket: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsResponse {
    pub link_id: Uuid,
    pub provider: String,
}

/// One document's bytes, ready for multipart transfer.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Response to POST /api/files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadResponse {
    pub file_id: Uuid,
    pub file_name: String,
    pub size_bytes: u64,
}

/// One entry from GET /api/files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub file_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// GET /api/score — the backend-computed investability score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    /// Overall score, 0-100.
    pub score: u32,
    pub components: Vec<ScoreComponent>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponent {
    pub name: String,
    pub score: u32,
}

/// Severity of an in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    Info,
    Warning,
    ActionRequired,
}

/// One entry from GET /api/notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub severity: NotificationSeverity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}
