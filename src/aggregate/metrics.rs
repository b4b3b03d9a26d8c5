// src/aggregate/metrics.rs

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    aggregate::migration::upgrade,
    models::{
        response::{AnswerChoice, CodeVersion, SubQuestion},
        submission::StoredSubmission,
    },
};

/// Per-question comparison of the clean and messy variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetrics {
    pub question_name: String,
    pub clean_responses: u64,
    pub messy_responses: u64,
    /// Rounded percentage of sub-question 1 answers that were YES.
    pub clean_understand_percent: u32,
    pub messy_understand_percent: u32,
    pub clean_avg_time_to_understand_ms: f64,
    pub messy_avg_time_to_understand_ms: f64,
    pub clean_avg_time_to_evaluate_ms: f64,
    pub messy_avg_time_to_evaluate_ms: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct VersionTally {
    understand: u64,
    understand_yes: u64,
    understand_time: f64,
    evaluate: u64,
    evaluate_time: f64,
}

impl VersionTally {
    fn responses(&self) -> u64 {
        self.understand + self.evaluate
    }

    fn understand_percent(&self) -> u32 {
        ratio(self.understand_yes as f64 * 100.0, self.understand).round() as u32
    }

    fn avg_understand(&self) -> f64 {
        ratio(self.understand_time, self.understand)
    }

    fn avg_evaluate(&self) -> f64 {
        ratio(self.evaluate_time, self.evaluate)
    }
}

fn ratio(total: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Metrics for the responses whose question name equals `question_name`.
pub fn question_metrics(submissions: &[StoredSubmission], question_name: &str) -> QuestionMetrics {
    let wanted = question_name.trim();
    let mut clean = VersionTally::default();
    let mut messy = VersionTally::default();

    for submission in submissions {
        let submission = upgrade(submission.clone());
        for response in &submission.responses {
            if response.question_name.as_deref().map(str::trim) != Some(wanted) {
                continue;
            }
            let tally = match response.code_version.as_deref().and_then(CodeVersion::parse) {
                Some(CodeVersion::Clean) => &mut clean,
                Some(CodeVersion::Messy) => &mut messy,
                None => continue,
            };

            let time = response.time_spent();
            match response.sub_question_index() {
                Some(i) if i == SubQuestion::Understand.index() => {
                    tally.understand += 1;
                    tally.understand_time += time;
                    if response.answer_token() == Some(AnswerChoice::Yes.as_str()) {
                        tally.understand_yes += 1;
                    }
                }
                Some(i) if i == SubQuestion::Evaluate.index() => {
                    tally.evaluate += 1;
                    tally.evaluate_time += time;
                }
                _ => {}
            }
        }
    }

    QuestionMetrics {
        question_name: wanted.to_string(),
        clean_responses: clean.responses(),
        messy_responses: messy.responses(),
        clean_understand_percent: clean.understand_percent(),
        messy_understand_percent: messy.understand_percent(),
        clean_avg_time_to_understand_ms: clean.avg_understand(),
        messy_avg_time_to_understand_ms: messy.avg_understand(),
        clean_avg_time_to_evaluate_ms: clean.avg_evaluate(),
        messy_avg_time_to_evaluate_ms: messy.avg_evaluate(),
    }
}

/// Metrics for every question name present, ordered by name.
pub fn all_question_metrics(submissions: &[StoredSubmission]) -> Vec<QuestionMetrics> {
    let names: BTreeSet<&str> = submissions
        .iter()
        .flat_map(|s| s.responses.iter())
        .filter_map(|r| r.question_name.as_deref().map(str::trim))
        .filter(|n| !n.is_empty())
        .collect();

    names
        .into_iter()
        .map(|name| question_metrics(submissions, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::StoredResponse;

    fn response(name: &str, version: &str, sub: u32, answer: &str, time: f64) -> StoredResponse {
        StoredResponse {
            question_name: Some(name.into()),
            code_version: Some(version.into()),
            sub_question: Some(serde_json::Value::from(sub)),
            answer: Some(answer.into()),
            time_spent_ms: Some(time),
            ..Default::default()
        }
    }

    fn submission(responses: Vec<StoredResponse>) -> StoredSubmission {
        StoredSubmission {
            id: 1,
            session_id: "s".into(),
            start_time: None,
            schema_version: 2,
            responses,
            created_at: None,
        }
    }

    #[test]
    fn understand_percent_is_rounded() {
        let data = [submission(vec![
            response("Sum", "Clean", 1, "YES", 1000.0),
            response("Sum", "Clean", 1, "YES", 2000.0),
            response("Sum", "Clean", 1, "NO", 3000.0),
            response("Other", "Clean", 1, "NO", 9000.0),
        ])];

        let m = question_metrics(&data, "Sum");
        assert_eq!(m.clean_understand_percent, 67);
        assert_eq!(m.clean_avg_time_to_understand_ms, 2000.0);
        assert_eq!(m.clean_responses, 3);
        assert_eq!(m.messy_responses, 0);
    }

    #[test]
    fn empty_buckets_yield_zero() {
        let m = question_metrics(&[], "Sum");
        assert_eq!(m.clean_understand_percent, 0);
        assert_eq!(m.messy_avg_time_to_evaluate_ms, 0.0);
    }

    #[test]
    fn splits_by_version_and_sub_question() {
        let data = [submission(vec![
            response("Sum", "Messy", 1, "NOT-SURE", 4000.0),
            response("Sum", "Messy", 2, "YES - off by one", 6000.0),
            response("Sum", "Messy", 2, "NO", 2000.0),
            response("Sum", "Clean", 2, "NO", 1000.0),
        ])];

        let m = question_metrics(&data, "Sum");
        assert_eq!(m.messy_understand_percent, 0);
        assert_eq!(m.messy_avg_time_to_understand_ms, 4000.0);
        assert_eq!(m.messy_avg_time_to_evaluate_ms, 4000.0);
        assert_eq!(m.clean_avg_time_to_evaluate_ms, 1000.0);
        assert_eq!(m.clean_avg_time_to_understand_ms, 0.0);
    }

    #[test]
    fn legacy_yes_with_text_counts_as_understood() {
        let data = [submission(vec![response("Sum", "Clean", 1, "YES - sums it", 10.0)])];
        assert_eq!(question_metrics(&data, "Sum").clean_understand_percent, 100);
    }

    #[test]
    fn all_metrics_cover_each_name_once() {
        let data = [
            submission(vec![response("B", "Clean", 1, "YES", 1.0)]),
            submission(vec![response("A", "Messy", 1, "NO", 1.0), response("B", "Messy", 1, "YES", 1.0)]),
        ];
        let names: Vec<String> = all_question_metrics(&data)
            .into_iter()
            .map(|m| m.question_name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
