// src/aggregate/table.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    aggregate::migration::upgrade,
    models::{
        response::{AnswerChoice, CodeVersion, SubQuestion},
        submission::StoredSubmission,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub code_version: CodeVersion,
    pub sub_question: u32,
    pub answer: String,
}

/// Count and time accumulator for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBucket {
    pub count: u64,
    pub total_time_ms: u64,
    pub average_time_ms: f64,
}

impl AggregateBucket {
    /// Adds one response and recomputes the running average.
    pub fn record(&mut self, time_ms: u64) {
        self.count += 1;
        self.total_time_ms += time_ms;
        self.average_time_ms = self.total_time_ms as f64 / self.count as f64;
    }
}

/// Flattened bucket for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub code_version: CodeVersion,
    pub sub_question: u32,
    pub answer: String,
    #[serde(flatten)]
    pub bucket: AggregateBucket,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTable {
    buckets: BTreeMap<BucketKey, AggregateBucket>,
    submissions: u64,
    skipped: u64,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: BucketKey, time_ms: u64) {
        self.buckets.entry(key).or_default().record(time_ms);
    }

    /// Bucket for the key; empty (count 0, average 0) when never seen.
    pub fn get(&self, code_version: CodeVersion, sub_question: u32, answer: &str) -> AggregateBucket {
        let key = BucketKey {
            code_version,
            sub_question,
            answer: answer.to_string(),
        };
        self.buckets.get(&key).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn submission_count(&self) -> u64 {
        self.submissions
    }

    /// Responses left out for missing or unusable fields.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn rows(&self) -> Vec<AggregateRow> {
        self.buckets
            .iter()
            .map(|(key, bucket)| AggregateRow {
                code_version: key.code_version,
                sub_question: key.sub_question,
                answer: key.answer.clone(),
                bucket: *bucket,
            })
            .collect()
    }

    /// Number of responses for one code version and sub-question.
    pub fn responses_for(&self, code_version: CodeVersion, sub_question: u32) -> u64 {
        self.buckets
            .iter()
            .filter(|(k, _)| k.code_version == code_version && k.sub_question == sub_question)
            .map(|(_, b)| b.count)
            .sum()
    }

    /// Percentage of "can you tell what this does" answers that were YES.
    pub fn understanding_rate(&self, code_version: CodeVersion) -> f64 {
        let sub_question = SubQuestion::Understand.index();
        let total = self.responses_for(code_version, sub_question);
        if total == 0 {
            return 0.0;
        }
        let yes = self
            .get(code_version, sub_question, AnswerChoice::Yes.as_str())
            .count;
        yes as f64 / total as f64 * 100.0
    }
}

/// Buckets every usable response by (code version, sub-question, answer).
pub fn aggregate(submissions: &[StoredSubmission]) -> AggregateTable {
    let mut table = AggregateTable::new();

    for submission in submissions {
        table.submissions += 1;
        let submission = upgrade(submission.clone());

        for response in &submission.responses {
            let code_version = response.code_version.as_deref().and_then(CodeVersion::parse);
            let sub_question = response.sub_question_index();
            let answer = response.answer_token();

            let (Some(code_version), Some(sub_question), Some(answer)) =
                (code_version, sub_question, answer)
            else {
                table.skipped += 1;
                continue;
            };

            let key = BucketKey {
                code_version,
                sub_question,
                answer: answer.to_string(),
            };
            table.insert(key, response.time_spent().round() as u64);
        }
    }

    if table.skipped > 0 {
        tracing::debug!(skipped = table.skipped, "Skipped incomplete responses");
    }
    table
}
