use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Analysed record
// ---------------------------------------------------------------------------

/// One record returned by the analysis service.
///
/// Values are kept loosely typed: the service may send ids and scores as
/// strings or numbers. Missing keys read as `Value::Null`. Keys not named
/// here (location, the scalar signals, anything the service adds) are kept
/// in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysedRecord {
    #[serde(default)]
    pub field_id: Value,
    #[serde(default)]
    pub field_name: Value,
    #[serde(default)]
    pub crop: Value,
    #[serde(default)]
    pub risk_level: Value,
    #[serde(default)]
    pub risk_score: Value,

    // Advisory text arrives under any of these names
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub advice: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub ai_message: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub feedback: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub response: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysedRecord {
    /// `field_id` rendered as a string for comparison. `None` when null or absent.
    pub fn field_id_string(&self) -> Option<String> {
        match &self.field_id {
            Value::Null => None,
            other => Some(display_value(other)),
        }
    }

    pub fn field_name_text(&self) -> String {
        display_value(&self.field_name)
    }

    pub fn crop_text(&self) -> String {
        display_value(&self.crop)
    }

    pub fn risk_level_text(&self) -> String {
        display_value(&self.risk_level)
    }

    pub fn risk_score_text(&self) -> String {
        display_value(&self.risk_score)
    }
}

/// Render a loose JSON value as display text: strings unquoted, null empty,
/// everything else in its JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Risk summary projection
// ---------------------------------------------------------------------------

/// List-level view of an analysed record. Borrowed; rebuilt on every read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSummaryEntry<'a> {
    pub field_id: &'a Value,
    pub field_name: &'a Value,
    pub crop: &'a Value,
    pub risk_level: &'a Value,
    pub risk_score: &'a Value,
}

impl<'a> From<&'a AnalysedRecord> for RiskSummaryEntry<'a> {
    fn from(record: &'a AnalysedRecord) -> Self {
        Self {
            field_id: &record.field_id,
            field_name: &record.field_name,
            crop: &record.crop,
            risk_level: &record.risk_level,
            risk_score: &record.risk_score,
        }
    }
}
