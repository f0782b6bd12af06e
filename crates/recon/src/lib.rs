//! `fieldrisk-recon` - reconciles remote analysis output with the canonical
//! field records.
//!
//! Pure crate: receives raw replies from an `AnalysisService`, returns
//! analysed records, derived summary views, and the selected record.
//! The HTTP transport lives in `fieldrisk-analysis-client`.

pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod scorer;
pub mod session;
pub mod summary;

pub use engine::{accept_response, reconcile_reply, RemoteReply};
pub use error::{
    AnalysisError, NOT_JSON_MESSAGE, NO_FILE_MESSAGE, NO_ROWS_MESSAGE, RUN_IN_PROGRESS_MESSAGE,
    UNEXPECTED_SHAPE_MESSAGE,
};
pub use matcher::{advisory_source, advisory_text, find_selected, ADVICE_PLACEHOLDER};
pub use model::{AnalysedRecord, RiskSummaryEntry};
pub use scorer::{assess, score_records, FieldSignals, LocalScorer, RiskAssessment, RiskLevel};
pub use session::{AnalysisService, Phase, Session, SourceFile, Transition};
pub use summary::{risk_summary, RiskTally};
