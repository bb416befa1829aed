use crate::model::entry::LexemeEntry;
use crate::model::settings::ExtractionRules;

use serde_json::Value;

/// First rule resolving to a non-empty string, else "".
fn first_text(record: &Value, rules: &[String]) -> String {
    rules
        .iter()
        .filter_map(|pointer| record.pointer(pointer))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Map one remote record to an entry. Total: unknown shapes give empty fields.
pub fn extract(record: &Value, rules: &ExtractionRules) -> LexemeEntry {
    let word = first_text(record, &rules.word);
    let translation = first_text(record, &rules.translation);
    let audio = first_text(record, &rules.audio);

    LexemeEntry::new(word, translation, Some(audio))
}

pub fn extract_all(records: &[Value], rules: &ExtractionRules) -> Vec<LexemeEntry> {
    records.iter().map(|r| extract(r, rules)).collect()
}
