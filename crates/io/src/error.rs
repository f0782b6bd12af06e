use std::fmt;

/// User-facing lead of every parse failure.
pub const PARSE_FAILED_MESSAGE: &str = "Failed to parse CSV. Please check the file format.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// File could not be read at all.
    Read(String),
    /// Input is not valid UTF-8.
    Encoding(String),
    /// Malformed delimited syntax (ragged row, bad quoting).
    Syntax { line: Option<u64>, message: String },
}

impl ParseError {
    /// Detail without the user-facing lead.
    pub fn detail(&self) -> String {
        match self {
            Self::Read(msg) => format!("cannot read file: {msg}"),
            Self::Encoding(msg) => format!("invalid UTF-8: {msg}"),
            Self::Syntax { line: Some(line), message } => format!("line {line}: {message}"),
            Self::Syntax { line: None, message } => message.clone(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PARSE_FAILED_MESSAGE} ({})", self.detail())
    }
}

impl std::error::Error for ParseError {}
