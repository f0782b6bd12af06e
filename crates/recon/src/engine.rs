use serde_json::Value;

use crate::error::{AnalysisError, NOT_JSON_MESSAGE, UNEXPECTED_SHAPE_MESSAGE};
use crate::model::AnalysedRecord;

/// What came back from one remote call: status plus the body as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReply {
    pub status: u16,
    pub body: String,
}

impl RemoteReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Turn a remote reply into analysed records.
///
/// Any status outside 2xx is a `Remote` error regardless of body shape.
pub fn reconcile_reply(reply: &RemoteReply) -> Result<Vec<AnalysedRecord>, AnalysisError> {
    if !reply.is_success() {
        log::warn!("analysis service returned status {}", reply.status);
        return Err(AnalysisError::remote_status(reply.status, &reply.body));
    }
    accept_response(&reply.body)
}

/// Accept a reply body that is either a JSON array of record objects or an
/// object with such an array under `fields`.
pub fn accept_response(raw: &str) -> Result<Vec<AnalysedRecord>, AnalysisError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        log::warn!("analysis reply is not JSON: {e}");
        let message = if raw.trim().is_empty() {
            NOT_JSON_MESSAGE.to_string()
        } else {
            raw.to_string()
        };
        AnalysisError::ResponseShape { message, raw: raw_text(raw) }
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("fields") {
            Some(Value::Array(items)) => items,
            _ => return Err(unexpected_shape(raw, "object without a `fields` array")),
        },
        _ => return Err(unexpected_shape(raw, "neither an array nor an object")),
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(unexpected_shape(raw, &format!("element {idx} is not an object")));
        }
        let record: AnalysedRecord = serde_json::from_value(item)
            .map_err(|e| unexpected_shape(raw, &format!("element {idx}: {e}")))?;
        records.push(record);
    }

    log::info!("accepted {} analysed record(s)", records.len());

    Ok(records)
}

fn unexpected_shape(raw: &str, why: &str) -> AnalysisError {
    log::warn!("unexpected analysis reply shape: {why}");
    AnalysisError::ResponseShape {
        message: UNEXPECTED_SHAPE_MESSAGE.to_string(),
        raw: raw_text(raw),
    }
}

fn raw_text(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
