use serde::Serialize;

use crate::model::{AnalysedRecord, RiskSummaryEntry};

/// Project every analysed record to its summary entry, in result order.
pub fn risk_summary(results: &[AnalysedRecord]) -> Vec<RiskSummaryEntry<'_>> {
    results.iter().map(RiskSummaryEntry::from).collect()
}

/// Per-level counts over the current results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskTally {
    pub total: usize,
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    /// Levels the service sent that are none of the three above.
    pub other: usize,
}

impl RiskTally {
    pub fn from_records(results: &[AnalysedRecord]) -> Self {
        let mut tally = Self { total: results.len(), ..Self::default() };

        for r in results {
            match r.risk_level_text().trim().to_ascii_lowercase().as_str() {
                "low" => tally.low += 1,
                "moderate" => tally.moderate += 1,
                "high" => tally.high += 1,
                _ => tally.other += 1,
            }
        }

        tally
    }
}
