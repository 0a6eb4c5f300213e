//! Read-side dashboard features — score, documents, notifications.
//!
//! Everything here is a thin view over the backend; the score is computed
//! remotely and only displayed. A missing score means the company profile
//! is not complete enough to rate yet.

use std::sync::Arc;

use crate::api::BackendApi;
use crate::api::types::{Notification, ScoreResponse, StoredDocument};
use crate::error::ApiError;

/// Read-side client for the post-onboarding dashboard.
pub struct Dashboard {
    api: Arc<dyn BackendApi>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    /// The investability score, or `None` while the backend has nothing to
    /// rate (profile incomplete).
    pub async fn fetch_score(&self) -> Result<Option<ScoreResponse>, ApiError> {
        match self.api.fetch_score().await {
            Ok(score) => Ok(Some(score)),
            Err(ApiError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// All documents stored remotely for this company.
    pub async fn list_documents(&self) -> Result<Vec<StoredDocument>, ApiError> {
        self.api.list_documents().await
    }

    /// In-app notifications, newest first.
    pub async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let mut notifications = self.api.fetch_notifications().await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// How many notifications are unread.
    pub async fn unread_count(&self) -> Result<usize, ApiError> {
        Ok(self
            .api
            .fetch_notifications()
            .await?
            .iter()
            .filter(|n| !n.read)
            .count())
    }
}
