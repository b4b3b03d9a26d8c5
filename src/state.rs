use std::sync::Arc;

use crate::{config::Config, models::question::QuestionItem};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub questions: Arc<Vec<QuestionItem>>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Vec<QuestionItem>> {
    fn from_ref(state: &AppState) -> Self {
        state.questions.clone()
    }
}
