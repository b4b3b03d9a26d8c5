// src/aggregate/mod.rs

//! Statistics over stored submissions.

pub mod metrics;
pub mod migration;
pub mod table;

use serde::Serialize;

use crate::models::{response::CodeVersion, submission::StoredSubmission};

pub use metrics::{QuestionMetrics, all_question_metrics, question_metrics};
pub use table::{AggregateBucket, AggregateRow, AggregateTable, BucketKey, aggregate};

/// Everything the results view renders, computed in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub submission_count: u64,
    pub skipped: u64,
    /// Rounded, like the per-question figures.
    pub clean_understand_percent: u32,
    pub messy_understand_percent: u32,
    pub buckets: Vec<AggregateRow>,
    pub questions: Vec<QuestionMetrics>,
}

impl StatsReport {
    pub fn from_submissions(submissions: &[StoredSubmission]) -> Self {
        let table = aggregate(submissions);
        Self {
            submission_count: table.submission_count(),
            skipped: table.skipped(),
            clean_understand_percent: table.understanding_rate(CodeVersion::Clean).round() as u32,
            messy_understand_percent: table.understanding_rate(CodeVersion::Messy).round() as u32,
            buckets: table.rows(),
            questions: all_question_metrics(submissions),
        }
    }
}
