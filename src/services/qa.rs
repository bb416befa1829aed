use crate::model::entry::LexemeEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaIssue {
    /// 0-based position in the extracted list
    pub index: usize,
    pub code: String,
    pub message: String,
}

fn issue(index: usize, code: &str, message: impl Into<String>) -> QaIssue {
    QaIssue {
        index,
        code: code.to_string(),
        message: message.into(),
    }
}

/// Flag entries that will make poor cards. Never blocks the run.
pub fn run(entries: &[LexemeEntry]) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();
    let mut first_by_url: HashMap<&str, usize> = HashMap::new();

    for (i, e) in entries.iter().enumerate() {
        if e.word.trim().is_empty() {
            issues.push(issue(i, "EMPTY_WORD", "no word found in record"));
        }

        if e.translation.trim().is_empty() {
            issues.push(issue(i, "EMPTY_TRANSLATION", "no translation found in record"));
        }

        match e.audio_url.as_deref() {
            None => issues.push(issue(i, "MISSING_AUDIO", "no audio URL found in record")),
            Some(url) => {
                // Entries sharing a URL share one cached file.
                if let Some(&first) = first_by_url.get(url) {
                    issues.push(issue(
                        i,
                        "SHARED_AUDIO_URL",
                        format!("audio URL also used by entry {first}"),
                    ));
                } else {
                    first_by_url.insert(url, i);
                }
            }
        }
    }

    issues
}
