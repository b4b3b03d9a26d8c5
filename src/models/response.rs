// src/models/response.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which variant of a snippet was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CodeVersion {
    Clean,
    Messy,
}

impl CodeVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeVersion::Clean => "Clean",
            CodeVersion::Messy => "Messy",
        }
    }

    /// Lenient parse used on stored records ("clean", " Messy ", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clean" => Some(CodeVersion::Clean),
            "messy" => Some(CodeVersion::Messy),
            _ => None,
        }
    }
}

impl fmt::Display for CodeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical answer selected with a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerChoice {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "NOT-SURE")]
    NotSure,
}

impl AnswerChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerChoice::Yes => "YES",
            AnswerChoice::No => "NO",
            AnswerChoice::NotSure => "NOT-SURE",
        }
    }

    /// Accepts the stored tokens as well as the button labels.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "YES" => Some(AnswerChoice::Yes),
            "NO" => Some(AnswerChoice::No),
            // The first survey build stored the HTML-escaped button label.
            "NOT-SURE" | "NOT SURE" | "I'M NOT SURE" | "I&APOS;M NOT SURE" => {
                Some(AnswerChoice::NotSure)
            }
            _ => None,
        }
    }
}

impl fmt::Display for AnswerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two questions asked about every snippet, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubQuestion {
    Understand,
    Evaluate,
}

impl SubQuestion {
    pub const FIRST: SubQuestion = SubQuestion::Understand;
    pub const COUNT: usize = 2;

    /// 1-based index as recorded in responses.
    pub fn index(&self) -> u32 {
        match self {
            SubQuestion::Understand => 1,
            SubQuestion::Evaluate => 2,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            SubQuestion::Understand => "Can you tell what this code is meant to do?",
            SubQuestion::Evaluate => "Do you see any problems with this code?",
        }
    }

    pub fn next(&self) -> Option<SubQuestion> {
        match self {
            SubQuestion::Understand => Some(SubQuestion::Evaluate),
            SubQuestion::Evaluate => None,
        }
    }
}

/// One recorded answer to one sub-question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub question_id: String,
    pub question_name: String,
    pub code_version: CodeVersion,
    #[serde(rename = "subQuestion", alias = "subQuestionIndex")]
    pub sub_question_index: u32,
    pub sub_question_prompt: String,
    /// Categorical token only; free text lives in `explanation`.
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub time_spent_ms: u64,
    /// Epoch milliseconds at which the answer was given.
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_labels_parse_to_tokens() {
        assert_eq!(AnswerChoice::parse("I'M NOT SURE"), Some(AnswerChoice::NotSure));
        assert_eq!(AnswerChoice::parse(" yes "), Some(AnswerChoice::Yes));
        assert_eq!(AnswerChoice::parse("maybe"), None);
    }

    #[test]
    fn response_uses_camel_case_keys() {
        let response = Response {
            question_id: "q1".into(),
            question_name: "Sum".into(),
            code_version: CodeVersion::Messy,
            sub_question_index: 2,
            sub_question_prompt: SubQuestion::Evaluate.prompt().into(),
            answer: "NO".into(),
            explanation: None,
            time_spent_ms: 1200,
            timestamp: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["codeVersion"], "Messy");
        assert_eq!(json["subQuestion"], 2);
        assert_eq!(json["timeSpentMs"], 1200);
        assert!(json.get("explanation").is_none());
    }
}
