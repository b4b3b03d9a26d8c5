// src/handlers/questions.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{question::QuestionItem, response::CodeVersion},
    utils::html::{EscapingHighlighter, SnippetLine, render_snippet},
};

const DEFAULT_LANGUAGE: &str = "python";

/// Returns the full question dataset.
pub async fn list_questions(
    State(questions): State<Arc<Vec<QuestionItem>>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(questions.as_ref().clone()))
}

#[derive(Debug, Deserialize)]
pub struct SnippetQuery {
    pub version: String,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetResponse {
    pub question_id: String,
    pub code_version: CodeVersion,
    pub language: String,
    pub lines: Vec<SnippetLine>,
}

/// Numbered, escaped lines of one snippet variant.
pub async fn get_snippet(
    State(questions): State<Arc<Vec<QuestionItem>>>,
    Path(id): Path<String>,
    Query(query): Query<SnippetQuery>,
) -> Result<impl IntoResponse, AppError> {
    let code_version = CodeVersion::parse(&query.version)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown code version '{}'", query.version)))?;

    let question = questions
        .iter()
        .find(|q| q.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Question '{}' not found", id)))?;

    let language = query
        .language
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let lines = render_snippet(question.snippet(code_version), &language, &EscapingHighlighter);

    Ok(Json(SnippetResponse {
        question_id: question.id.clone(),
        code_version,
        language,
        lines,
    }))
}
