use serde_json::Value;

use crate::model::{display_value, AnalysedRecord};

/// Shown when a record carries no advisory text under any accepted name.
pub const ADVICE_PLACEHOLDER: &str = "No recommendation text returned from the model.";

pub type Accessor = fn(&AnalysedRecord) -> &Value;

/// Advisory text sources, highest priority first.
pub const ADVISORY_SOURCES: [(&str, Accessor); 4] = [
    ("advice", advice),
    ("ai_message", ai_message),
    ("feedback", feedback),
    ("response", response),
];

fn advice(r: &AnalysedRecord) -> &Value {
    &r.advice
}

fn ai_message(r: &AnalysedRecord) -> &Value {
    &r.ai_message
}

fn feedback(r: &AnalysedRecord) -> &Value {
    &r.feedback
}

fn response(r: &AnalysedRecord) -> &Value {
    &r.response
}

/// First record whose `field_id`, compared as a string, equals `selection_id`.
///
/// An empty selection means "none". A selection that matches nothing also
/// yields `None`; it is not corrected. Duplicate ids resolve to the first
/// occurrence.
pub fn find_selected<'a>(results: &'a [AnalysedRecord], selection_id: &str) -> Option<&'a AnalysedRecord> {
    if selection_id.is_empty() {
        return None;
    }
    results
        .iter()
        .find(|r| r.field_id_string().as_deref() == Some(selection_id))
}

/// Advisory text for a record: the first non-empty candidate, or the placeholder.
pub fn advisory_text(record: &AnalysedRecord) -> String {
    advisory_source(record)
        .map(|(_, text)| text)
        .unwrap_or_else(|| ADVICE_PLACEHOLDER.to_string())
}

/// Which key supplied the advisory text, with the text itself.
///
/// Null, absent and `""` are empty. Whitespace counts as text, and numbers
/// and booleans render as their JSON text.
pub fn advisory_source(record: &AnalysedRecord) -> Option<(&'static str, String)> {
    ADVISORY_SOURCES.iter().find_map(|(name, get)| {
        let value = get(record);
        if value.is_array() || value.is_object() {
            return None;
        }
        let text = display_value(value);
        if text.is_empty() {
            None
        } else {
            Some((*name, text))
        }
    })
}
