// src/models/submission.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

use crate::models::{response::Response, session::Session};

/// Represents the 'submissions' table in the database.
/// The session body is stored verbatim in `payload`.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: i64,
    pub session_id: String,
    pub schema_version: i64,
    pub payload: String,
    pub created_at: Option<String>,
}

/// A response as it appears in stored records.
///
/// Every field is optional: older clients wrote different shapes and the
/// aggregator skips what it cannot use instead of rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_version: Option<String>,
    /// Number or numeric string, depending on the client that wrote it.
    #[serde(
        default,
        rename = "subQuestion",
        alias = "subQuestionIndex",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_question: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_question_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl StoredResponse {
    /// 1-based sub-question index, if present and numeric.
    pub fn sub_question_index(&self) -> Option<u32> {
        match self.sub_question.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Trimmed answer, `None` when missing or blank.
    pub fn answer_token(&self) -> Option<&str> {
        self.answer
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    /// Time spent, negative or non-finite values read as zero.
    pub fn time_spent(&self) -> f64 {
        match self.time_spent_ms {
            Some(t) if t.is_finite() && t > 0.0 => t,
            _ => 0.0,
        }
    }
}

fn legacy_schema_version() -> u32 {
    1
}

/// DTO accepted by `POST /api/submissions`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[validate(
        length(min = 1, max = 128, message = "Session id must be between 1 and 128 characters."),
        custom(function = validate_not_blank)
    )]
    pub session_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,

    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,

    #[validate(length(max = 1000, message = "At most 1000 responses per submission."))]
    #[serde(default)]
    pub responses: Vec<StoredResponse>,
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("session_id_blank"));
    }
    Ok(())
}

/// A stored submission as returned by `GET /api/submissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubmission {
    pub id: i64,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub responses: Vec<StoredResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl StoredSubmission {
    /// Builds a record with no database identity, e.g. from a local session.
    pub fn from_payload(id: i64, payload: SubmissionPayload) -> Self {
        Self {
            id,
            session_id: payload.session_id,
            start_time: payload.start_time,
            schema_version: payload.schema_version,
            responses: payload.responses,
            created_at: None,
        }
    }
}

impl TryFrom<SubmissionRow> for StoredSubmission {
    type Error = serde_json::Error;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let payload: SubmissionPayload = serde_json::from_str(&row.payload)?;
        Ok(Self {
            id: row.id,
            session_id: row.session_id,
            start_time: payload.start_time,
            schema_version: u32::try_from(row.schema_version).unwrap_or(1),
            responses: payload.responses,
            created_at: row.created_at,
        })
    }
}

impl From<&Response> for StoredResponse {
    fn from(response: &Response) -> Self {
        Self {
            question_id: Some(response.question_id.clone()),
            question_name: Some(response.question_name.clone()),
            code_version: Some(response.code_version.as_str().to_string()),
            sub_question: Some(Value::from(response.sub_question_index)),
            sub_question_prompt: Some(response.sub_question_prompt.clone()),
            answer: Some(response.answer.clone()),
            explanation: response.explanation.clone(),
            time_spent_ms: Some(response.time_spent_ms as f64),
            timestamp: Some(response.timestamp),
        }
    }
}

impl From<&Session> for SubmissionPayload {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id.clone(),
            start_time: Some(Value::String(session.start_time.to_rfc3339())),
            schema_version: session.schema_version,
            responses: session.responses.iter().map(StoredResponse::from).collect(),
        }
    }
}

/// Envelope of `GET /api/submissions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionList {
    #[serde(default)]
    pub submissions: Vec<StoredSubmission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_shapes() {
        let response: StoredResponse = serde_json::from_value(serde_json::json!({
            "codeVersion": "Clean",
            "subQuestion": "2",
            "answer": "  NO - too complex ",
            "timeSpentMs": -5
        }))
        .unwrap();

        assert_eq!(response.sub_question_index(), Some(2));
        assert_eq!(response.answer_token(), Some("NO - too complex"));
        assert_eq!(response.time_spent(), 0.0);
    }

    #[test]
    fn payload_without_version_is_legacy() {
        let payload: SubmissionPayload = serde_json::from_value(serde_json::json!({
            "sessionId": "abc",
            "responses": []
        }))
        .unwrap();

        assert_eq!(payload.schema_version, 1);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn blank_session_id_fails_validation() {
        let payload: SubmissionPayload =
            serde_json::from_value(serde_json::json!({ "sessionId": "   " })).unwrap();
        assert!(payload.validate().is_err());
    }
}
