// src/handlers/stats.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    aggregate::{StatsReport, all_question_metrics, question_metrics},
    error::AppError,
    handlers::submissions::fetch_submissions,
    models::question::QuestionItem,
};

/// Aggregate buckets, understanding rates and per-question metrics.
pub async fn get_stats(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let submissions = fetch_submissions(&pool).await?;
    Ok(Json(StatsReport::from_submissions(&submissions)))
}

/// Metrics for every question that has responses.
pub async fn list_question_stats(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let submissions = fetch_submissions(&pool).await?;
    Ok(Json(all_question_metrics(&submissions)))
}

/// Metrics for one question by name.
///
/// Known questions without responses report zeros; unknown names are 404.
pub async fn get_question_stats(
    State(pool): State<SqlitePool>,
    State(questions): State<Arc<Vec<QuestionItem>>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let submissions = fetch_submissions(&pool).await?;
    let metrics = question_metrics(&submissions, &name);

    let in_dataset = questions.iter().any(|q| q.name.trim() == metrics.question_name);
    if !in_dataset && metrics.clean_responses + metrics.messy_responses == 0 {
        return Err(AppError::NotFound(format!("Question '{}' not found", name)));
    }

    Ok(Json(metrics))
}
