//! Session state for one operator working one file at a time.
//!
//! All mutation goes through [`Session::apply`] with one [`Transition`].
//! Starting a new file or a new run clears results, selection, and error
//! before anything else happens, so stale output is never visible while a
//! new operation is underway. Only one run may be in flight.

use std::path::{Path, PathBuf};

use fieldrisk_core::FieldRecord;
use fieldrisk_io::{duplicate_field_ids, IngestOptions, ParseError};

use crate::engine::{reconcile_reply, RemoteReply};
use crate::error::{AnalysisError, NO_FILE_MESSAGE, NO_ROWS_MESSAGE, RUN_IN_PROGRESS_MESSAGE};
use crate::matcher::{advisory_text, find_selected};
use crate::model::{AnalysedRecord, RiskSummaryEntry};
use crate::summary::{risk_summary, RiskTally};

/// The remote analysis call, as seen by the session.
///
/// Implementations send the full record batch in one request and hand back
/// the status and body untouched. A failure to obtain any reply at all is a
/// `Remote` error with no status.
pub trait AnalysisService {
    fn submit(&self, records: &[FieldRecord]) -> Result<RemoteReply, AnalysisError>;
}

/// Reference to the chosen input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
}

impl SourceFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// A remote call is outstanding.
    Running,
}

#[derive(Debug, Clone)]
pub enum Transition {
    /// A file was chosen (`Some`) or the choice was cleared (`None`).
    FileSelected(Option<SourceFile>),
    ParseComplete(Vec<FieldRecord>),
    ParseFailed(ParseError),
    RunStarted,
    RunSucceeded(Vec<AnalysedRecord>),
    RunFailed(AnalysisError),
    SelectionChanged(String),
}

impl Transition {
    fn name(&self) -> &'static str {
        match self {
            Self::FileSelected(_) => "file_selected",
            Self::ParseComplete(_) => "parse_complete",
            Self::ParseFailed(_) => "parse_failed",
            Self::RunStarted => "run_started",
            Self::RunSucceeded(_) => "run_succeeded",
            Self::RunFailed(_) => "run_failed",
            Self::SelectionChanged(_) => "selection_changed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    file: Option<SourceFile>,
    records: Vec<FieldRecord>,
    results: Vec<AnalysedRecord>,
    selection: String,
    phase: Phase,
    error: Option<AnalysisError>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// Apply one transition.
    ///
    /// Returns `Err` when the transition is refused or when it records a
    /// validation failure. A refused transition (wrong phase) leaves the
    /// state untouched; a validation failure becomes the active error.
    pub fn apply(&mut self, transition: Transition) -> Result<(), AnalysisError> {
        log::debug!("session transition: {} (phase {:?})", transition.name(), self.phase);

        match transition {
            Transition::FileSelected(file) => {
                self.refuse_while_running()?;
                self.clear_run_output();
                self.records.clear();
                self.file = file;
                Ok(())
            }
            Transition::ParseComplete(records) => {
                self.refuse_while_running()?;
                if self.file.is_none() {
                    return Err(AnalysisError::Validation(NO_FILE_MESSAGE.into()));
                }
                let dupes = duplicate_field_ids(&records);
                if !dupes.is_empty() {
                    log::warn!(
                        "{} duplicate field_id value(s) in batch; selection resolves to the first: {:?}",
                        dupes.len(),
                        dupes,
                    );
                }
                self.records = records;
                Ok(())
            }
            Transition::ParseFailed(err) => {
                self.refuse_while_running()?;
                self.records.clear();
                self.error = Some(AnalysisError::Parse(err));
                Ok(())
            }
            Transition::RunStarted => {
                self.refuse_while_running()?;
                self.clear_run_output();

                let failure = if self.file.is_none() {
                    Some(NO_FILE_MESSAGE)
                } else if self.records.is_empty() {
                    Some(NO_ROWS_MESSAGE)
                } else {
                    None
                };
                if let Some(msg) = failure {
                    let err = AnalysisError::Validation(msg.into());
                    self.error = Some(err.clone());
                    return Err(err);
                }

                self.phase = Phase::Running;
                Ok(())
            }
            Transition::RunSucceeded(results) => {
                self.require_running()?;
                self.phase = Phase::Idle;
                self.selection = results
                    .first()
                    .and_then(AnalysedRecord::field_id_string)
                    .unwrap_or_default();
                self.results = results;
                Ok(())
            }
            Transition::RunFailed(err) => {
                self.require_running()?;
                self.phase = Phase::Idle;
                self.error = Some(err);
                Ok(())
            }
            Transition::SelectionChanged(id) => {
                self.selection = id;
                Ok(())
            }
        }
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Choose a file and parse it.
    pub fn load_file(&mut self, path: &Path, opts: &IngestOptions) -> Result<(), AnalysisError> {
        self.apply(Transition::FileSelected(Some(SourceFile::from_path(path))))?;

        match fieldrisk_io::read_fields(path, opts) {
            Ok(records) => self.apply(Transition::ParseComplete(records)),
            Err(err) => {
                log::warn!("parse failed for {}: {}", path.display(), err.detail());
                self.apply(Transition::ParseFailed(err.clone()))?;
                Err(AnalysisError::Parse(err))
            }
        }
    }

    /// Submit the current records and reconcile the reply.
    pub fn run(&mut self, service: &dyn AnalysisService) -> Result<(), AnalysisError> {
        self.begin_run()?;
        let reply = service.submit(&self.records);
        self.finish_run(reply)
    }

    /// Enter the running phase. The batch to send is `records()`; the
    /// session stays loading until `finish_run` is called.
    pub fn begin_run(&mut self) -> Result<(), AnalysisError> {
        self.apply(Transition::RunStarted)?;
        log::info!("submitting {} field record(s) for analysis", self.records.len());
        Ok(())
    }

    /// Reconcile the service's reply and leave the running phase.
    pub fn finish_run(&mut self, reply: Result<RemoteReply, AnalysisError>) -> Result<(), AnalysisError> {
        match reply.and_then(|reply| reconcile_reply(&reply)) {
            Ok(results) => {
                log::info!("analysis returned {} record(s)", results.len());
                self.apply(Transition::RunSucceeded(results))
            }
            Err(err) => {
                log::warn!("analysis run failed ({}): {}", err.kind(), err);
                self.apply(Transition::RunFailed(err.clone()))?;
                Err(err)
            }
        }
    }

    pub fn select(&mut self, field_id: impl Into<String>) {
        // SelectionChanged is accepted in every phase
        let _ = self.apply(Transition::SelectionChanged(field_id.into()));
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn file(&self) -> Option<&SourceFile> {
        self.file.as_ref()
    }

    pub fn records(&self) -> &[FieldRecord] {
        &self.records
    }

    pub fn results(&self) -> &[AnalysedRecord] {
        &self.results
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// Selected field id; empty means none.
    pub fn selection_id(&self) -> &str {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(AnalysisError::message)
    }

    pub fn risk_summary(&self) -> Vec<RiskSummaryEntry<'_>> {
        risk_summary(&self.results)
    }

    pub fn risk_tally(&self) -> RiskTally {
        RiskTally::from_records(&self.results)
    }

    pub fn selected(&self) -> Option<&AnalysedRecord> {
        find_selected(&self.results, &self.selection)
    }

    /// Advisory text of the selected record, placeholder included.
    pub fn selected_advice(&self) -> Option<String> {
        self.selected().map(advisory_text)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn clear_run_output(&mut self) {
        self.error = None;
        self.results.clear();
        self.selection.clear();
    }

    fn refuse_while_running(&self) -> Result<(), AnalysisError> {
        if self.phase == Phase::Running {
            return Err(AnalysisError::Validation(RUN_IN_PROGRESS_MESSAGE.into()));
        }
        Ok(())
    }

    fn require_running(&self) -> Result<(), AnalysisError> {
        if self.phase != Phase::Running {
            return Err(AnalysisError::Validation("No analysis run is in progress.".into()));
        }
        Ok(())
    }
}
