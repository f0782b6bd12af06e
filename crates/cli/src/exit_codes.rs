//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 2    | CLI usage error (bad arguments)                          |
//! | 3    | Configuration error (bad config file or env value)       |
//! | 4    | Input CSV could not be parsed                            |
//! | 5    | Validation failed before any request (no rows, bad data) |
//! | 6    | Analysis service failed (non-2xx status or network)      |
//! | 7    | Analysis service replied with an unusable body           |
//! | 8    | Local I/O error (writing output)                         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`

use fieldrisk_recon::AnalysisError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file unreadable or malformed, or an invalid env override.
pub const EXIT_CONFIG: u8 = 3;

/// CSV input could not be parsed.
pub const EXIT_PARSE: u8 = 4;

/// Local precondition failed; nothing was sent.
pub const EXIT_VALIDATION: u8 = 5;

/// Analysis service returned a non-success status, or was unreachable.
pub const EXIT_REMOTE: u8 = 6;

/// Analysis reply was not JSON, or not an array / `{ "fields": [...] }`.
pub const EXIT_RESPONSE_SHAPE: u8 = 7;

/// Writing output failed.
pub const EXIT_IO: u8 = 8;

/// Map an analysis error to its exit code.
pub fn analysis_exit_code(err: &AnalysisError) -> u8 {
    match err {
        AnalysisError::Parse(_) => EXIT_PARSE,
        AnalysisError::Validation(_) => EXIT_VALIDATION,
        AnalysisError::Remote { .. } => EXIT_REMOTE,
        AnalysisError::ResponseShape { .. } => EXIT_RESPONSE_SHAPE,
    }
}
