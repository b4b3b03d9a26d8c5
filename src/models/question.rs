// src/models/question.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::response::CodeVersion;

/// One snippet pair from the static dataset.
///
/// The dataset file keeps the column names of the spreadsheet it was
/// exported from, hence the renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    /// Assigned at load time (`q1`, `q2`, ...); the dataset has no ids.
    #[serde(default)]
    pub id: String,

    #[serde(rename = "Name")]
    pub name: String,

    /// Short description shown under the title.
    #[serde(rename = "What does this do?", default)]
    pub prompt: String,

    #[serde(rename = "Clean Version")]
    pub clean_version: String,

    #[serde(rename = "Messy Version")]
    pub messy_version: String,
}

impl QuestionItem {
    /// Source text for the given code version.
    pub fn snippet(&self, version: CodeVersion) -> &str {
        match version {
            CodeVersion::Clean => &self.clean_version,
            CodeVersion::Messy => &self.messy_version,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parses the dataset JSON array and assigns positional ids.
pub fn parse_dataset(raw: &str) -> Result<Vec<QuestionItem>, DatasetError> {
    let mut items: Vec<QuestionItem> = serde_json::from_str(raw)?;
    for (idx, item) in items.iter_mut().enumerate() {
        item.id = format!("q{}", idx + 1);
    }
    Ok(items)
}

/// Loads the dataset once at start-up.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<QuestionItem>, DatasetError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let items = parse_dataset(&raw)?;
    tracing::info!(
        "Loaded {} questions from {}",
        items.len(),
        path.as_ref().display()
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spreadsheet_keys_and_assigns_ids() {
        let raw = r#"[
            {"Name": "Sum", "What does this do?": "Adds numbers", "Clean Version": "def total(xs):\n    return sum(xs)", "Messy Version": "def f(a):\n    t=0\n    for i in a: t+=i\n    return t"},
            {"Name": "Max", "Clean Version": "max(xs)", "Messy Version": "sorted(xs)[-1]"}
        ]"#;

        let items = parse_dataset(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "q1");
        assert_eq!(items[1].id, "q2");
        assert_eq!(items[0].prompt, "Adds numbers");
        assert_eq!(items[1].prompt, "");
        assert_eq!(items[1].snippet(CodeVersion::Messy), "sorted(xs)[-1]");
    }

    #[test]
    fn rejects_malformed_dataset() {
        assert!(matches!(
            parse_dataset("{\"Name\": 1}"),
            Err(DatasetError::Parse(_))
        ));
    }
}
