//! HTTP implementation of the backend seam.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::api::session::SessionToken;
use crate::api::traits::BackendApi;
use crate::api::types::{
    CompanyRequest, CompanyResponse, DocumentPayload, FileUploadResponse, FinancialsRequest,
    FinancialsResponse, KycRequest, KycResponse, Notification, ScoreResponse, StoredDocument,
};
use crate::config::OnboardConfig;
use crate::error::ApiError;

/// Talks to the backend over HTTPS with a bearer session token.
#[derive(Debug)]
pub struct HttpBackend {
    base_url: String,
    token: SessionToken,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &OnboardConfig, token: SessionToken) -> Result<Self, ApiError> {
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::InvalidBaseUrl(config.api_base_url.clone()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(self.token.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(path, response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(path, response).await
    }
}

/// Map a response to a typed body, or the status to an [`ApiError`].
async fn decode<R: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<R, ApiError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<R>().await.map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        });
    }

    let detail = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth {
            endpoint: endpoint.to_string(),
        },
        StatusCode::NOT_FOUND => ApiError::NotFound {
            endpoint: endpoint.to_string(),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation {
            endpoint: endpoint.to_string(),
            detail,
        },
        other => ApiError::Provider {
            endpoint: endpoint.to_string(),
            status: other.as_u16(),
            detail,
        },
    })
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn create_company(&self, request: &CompanyRequest) -> Result<CompanyResponse, ApiError> {
        self.post_json("/api/company", request).await
    }

    async fn verify_kyc(&self, request: &KycRequest) -> Result<KycResponse, ApiError> {
        self.post_json("/api/kyc/verify", request).await
    }

    async fn link_financials(
        &self,
        request: &FinancialsRequest,
    ) -> Result<FinancialsResponse, ApiError> {
        self.post_json("/api/financials/link", request).await
    }

    async fn upload_document(
        &self,
        company_id: Uuid,
        payload: DocumentPayload,
    ) -> Result<FileUploadResponse, ApiError> {
        let path = "/api/files";
        let part = Part::bytes(payload.bytes)
            .file_name(payload.file_name.clone())
            .mime_str(&payload.content_type)
            .map_err(|e| ApiError::Validation {
                endpoint: path.to_string(),
                detail: format!("invalid content type {}: {e}", payload.content_type),
            })?;
        let form = Form::new()
            .text("companyId", company_id.to_string())
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(self.token.expose())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(path, response).await
    }

    async fn list_documents(&self) -> Result<Vec<StoredDocument>, ApiError> {
        self.get_json("/api/files").await
    }

    async fn fetch_score(&self) -> Result<ScoreResponse, ApiError> {
        self.get_json("/api/score").await
    }

    async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get_json("/api/notifications").await
    }
}
