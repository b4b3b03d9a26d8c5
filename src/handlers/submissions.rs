// src/handlers/submissions.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        session::SaveReceipt,
        submission::{StoredSubmission, SubmissionList, SubmissionPayload, SubmissionRow},
    },
};

/// Stores a completed session.
///
/// * Validates the payload.
/// * Inserts it keyed by session id.
/// * A session id that is already stored is not inserted again; the existing
///   id is returned with 200 so a client retry is harmless.
pub async fn create_submission(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SubmissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let body = serde_json::to_string(&payload)?;

    let inserted: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO submissions (session_id, schema_version, payload)
        VALUES (?, ?, ?)
        ON CONFLICT(session_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(&payload.session_id)
    .bind(i64::from(payload.schema_version))
    .bind(&body)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert submission: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if let Some((id,)) = inserted {
        tracing::info!(
            session_id = %payload.session_id,
            responses = payload.responses.len(),
            "Stored submission {}",
            id
        );
        return Ok((
            StatusCode::CREATED,
            Json(SaveReceipt {
                saved_id: id,
                message: "Submission saved".to_string(),
            }),
        ));
    }

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM submissions WHERE session_id = ?")
        .bind(&payload.session_id)
        .fetch_one(&pool)
        .await?;

    tracing::info!(session_id = %payload.session_id, "Submission already stored as {}", id);
    Ok((
        StatusCode::OK,
        Json(SaveReceipt {
            saved_id: id,
            message: "Submission already stored".to_string(),
        }),
    ))
}

/// Lists every stored submission.
pub async fn list_submissions(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let submissions = fetch_submissions(&pool).await?;
    Ok(Json(SubmissionList { submissions }))
}

/// Loads all rows; rows whose payload no longer parses are skipped.
pub async fn fetch_submissions(pool: &SqlitePool) -> Result<Vec<StoredSubmission>, AppError> {
    let rows: Vec<SubmissionRow> = sqlx::query_as(
        r#"
        SELECT id, session_id, schema_version, payload, created_at
        FROM submissions
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch submissions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let submissions = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.id;
            match StoredSubmission::try_from(row) {
                Ok(submission) => Some(submission),
                Err(e) => {
                    tracing::warn!("Skipping submission {} with unreadable payload: {}", id, e);
                    None
                }
            }
        })
        .collect();

    Ok(submissions)
}
