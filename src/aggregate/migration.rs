// src/aggregate/migration.rs

//! Upgrades stored submission records to the current layout.
//!
//! Version 1 records (no `schemaVersion`) kept the free-text elaboration
//! inside `answer`, e.g. `"NO - too complex"`, and stored the escaped
//! button label for "not sure". Version 2 keeps the categorical token in
//! `answer` and the text in `explanation`.

use crate::models::{
    response::AnswerChoice, session::CURRENT_SCHEMA_VERSION, submission::StoredResponse,
    submission::StoredSubmission,
};

/// Separator between the answer token and appended free text.
pub const LEGACY_ANSWER_SEPARATOR: &str = " - ";

/// Brings `record` to [`CURRENT_SCHEMA_VERSION`].
///
/// Responses are normalized regardless of the declared version, since a
/// few clients wrote combined answers under the new version number.
pub fn upgrade(mut record: StoredSubmission) -> StoredSubmission {
    if record.schema_version < CURRENT_SCHEMA_VERSION {
        tracing::trace!(
            session_id = %record.session_id,
            from = record.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "Upgrading stored submission"
        );
    }

    for response in &mut record.responses {
        normalize_answer(response);
    }
    record.schema_version = record.schema_version.max(CURRENT_SCHEMA_VERSION);
    record
}

/// Splits a combined answer and canonicalizes known tokens.
pub fn normalize_answer(response: &mut StoredResponse) {
    let Some(answer) = response.answer.as_deref() else {
        return;
    };

    let (token, appended) = match answer.split_once(LEGACY_ANSWER_SEPARATOR) {
        Some((token, rest)) => (token.trim(), Some(rest.trim())),
        None => (answer.trim(), None),
    };

    let token = match AnswerChoice::parse(token) {
        Some(choice) => choice.as_str().to_string(),
        None => token.to_string(),
    };

    let has_explanation = response
        .explanation
        .as_deref()
        .is_some_and(|e| !e.trim().is_empty());
    if let Some(text) = appended.filter(|t| !t.is_empty()) {
        if !has_explanation {
            response.explanation = Some(text.to_string());
        }
    }

    response.answer = Some(token);
}
