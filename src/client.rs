// src/client.rs

//! Client side of the persistence endpoint.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::instrument;

use crate::models::{
    session::{SaveReceipt, Session},
    submission::{StoredSubmission, SubmissionList, SubmissionPayload},
};

/// Failure talking to the persistence endpoint. One attempt is made per
/// call; retrying is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("persistence endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

pub type SubmissionError = ClientError;
pub type FetchError = ClientError;

/// Where completed sessions go and where aggregates are read from.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn submit(&self, session: &Session) -> Result<SaveReceipt, SubmissionError>;

    async fn fetch_all(&self) -> Result<Vec<StoredSubmission>, FetchError>;
}

/// HTTP client for `POST /api/submissions` and `GET /api/submissions`.
#[derive(Debug, Clone)]
pub struct HttpSubmissionClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSubmissionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    fn submissions_url(&self) -> String {
        format!("{}/api/submissions", self.base_url)
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl SubmissionStore for HttpSubmissionClient {
    #[instrument(skip_all, fields(session_id = %session.session_id))]
    async fn submit(&self, session: &Session) -> Result<SaveReceipt, SubmissionError> {
        let response = self
            .client
            .post(self.submissions_url())
            .json(session)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let receipt: SaveReceipt =
            serde_json::from_str(&body).map_err(|e| ClientError::MalformedBody(e.to_string()))?;

        tracing::info!(saved_id = receipt.saved_id, "Submission saved");
        Ok(receipt)
    }

    #[instrument(skip_all)]
    async fn fetch_all(&self) -> Result<Vec<StoredSubmission>, FetchError> {
        let response = self
            .client
            .get(self.submissions_url())
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let list: SubmissionList =
            serde_json::from_str(&body).map_err(|e| ClientError::MalformedBody(e.to_string()))?;

        tracing::debug!(count = list.submissions.len(), "Fetched submissions");
        Ok(list.submissions)
    }
}

/// In-process store, keyed by session id like the service.
#[derive(Debug, Default)]
pub struct MemoryStore {
    submissions: Mutex<Vec<StoredSubmission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.submissions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn submit(&self, session: &Session) -> Result<SaveReceipt, SubmissionError> {
        let mut submissions = self
            .submissions
            .lock()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if let Some(existing) = submissions
            .iter()
            .find(|s| s.session_id == session.session_id)
        {
            return Ok(SaveReceipt {
                saved_id: existing.id,
                message: "Submission already stored".to_string(),
            });
        }

        let id = submissions.len() as i64 + 1;
        submissions.push(StoredSubmission::from_payload(
            id,
            SubmissionPayload::from(session),
        ));
        Ok(SaveReceipt {
            saved_id: id,
            message: "Submission saved".to_string(),
        })
    }

    async fn fetch_all(&self) -> Result<Vec<StoredSubmission>, FetchError> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .map_err(|e| ClientError::Network(e.to_string()))
    }
}
