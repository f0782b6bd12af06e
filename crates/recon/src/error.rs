use std::fmt;

use fieldrisk_io::ParseError;

pub const NO_FILE_MESSAGE: &str = "Please choose a CSV file first.";
pub const NO_ROWS_MESSAGE: &str = "No rows found in the CSV. Please check the file.";
pub const RUN_IN_PROGRESS_MESSAGE: &str = "An analysis run is already in progress.";
pub const NOT_JSON_MESSAGE: &str = "Server returned data that is not valid JSON.";
pub const UNEXPECTED_SHAPE_MESSAGE: &str = "Server returned an unexpected response shape.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Tabular input could not be parsed. Clears the record set.
    Parse(ParseError),
    /// Local precondition failed; no request was sent.
    Validation(String),
    /// Non-success HTTP status (`status: Some`) or a network-level failure.
    Remote { status: Option<u16>, message: String },
    /// Reply body was not JSON, or not an array / `{ "fields": [...] }`.
    ResponseShape { message: String, raw: Option<String> },
}

impl AnalysisError {
    /// Error for a non-success status. The body is surfaced verbatim when present.
    pub fn remote_status(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("Request failed with status {status}")
        } else {
            body.to_string()
        };
        Self::Remote { status: Some(status), message }
    }

    /// Error for a request that never produced a status.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Remote { status: None, message: message.into() }
    }

    /// The single user-visible message.
    pub fn message(&self) -> String {
        match self {
            Self::Parse(err) => err.to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Remote { message, .. } => message.clone(),
            Self::ResponseShape { message, .. } => message.clone(),
        }
    }

    /// Raw reply text kept for diagnostics, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::ResponseShape { raw, .. } => raw.as_deref(),
            _ => None,
        }
    }

    /// Stable short name for logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_error",
            Self::Validation(_) => "validation_error",
            Self::Remote { .. } => "remote_error",
            Self::ResponseShape { .. } => "response_shape_error",
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for AnalysisError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}
