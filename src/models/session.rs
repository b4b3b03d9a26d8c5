// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::response::Response;

/// Layout version written by this crate. Records without a version are
/// treated as version 1 (answer and free text combined in one string).
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// One participant's run through the question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub schema_version: u32,
    pub responses: Vec<Response>,
}

impl Session {
    pub fn new(session_id: String, start_time: DateTime<Utc>) -> Self {
        Self {
            session_id,
            start_time,
            schema_version: CURRENT_SCHEMA_VERSION,
            responses: Vec::new(),
        }
    }
}

/// Body returned by the persistence endpoint after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub saved_id: i64,
    #[serde(default)]
    pub message: String,
}
