//! Reference risk scorer.
//!
//! The same heuristic the analysis service applies, available locally so a
//! batch can be scored without the network. Combines four agronomic signals
//! into a score between 0 and 1:
//!
//! | Signal          | Risk rises when            | Weight |
//! |-----------------|----------------------------|--------|
//! | soil moisture   | far from 60 (either side)  | 0.30   |
//! | pest pressure   | high                       | 0.30   |
//! | vigor index     | below 70                   | 0.20   |
//! | yield history   | below 80                   | 0.20   |
//!
//! Scores are rounded to two decimals. `< 0.35` is Low, `< 0.7` Moderate,
//! anything else High.

use serde::Serialize;
use serde_json::{json, Map};

use fieldrisk_core::{CanonicalField, FieldRecord};

use crate::engine::RemoteReply;
use crate::error::AnalysisError;
use crate::model::AnalysedRecord;
use crate::session::AnalysisService;

const IDEAL_MOISTURE: f64 = 60.0;
const VIGOR_FLOOR: f64 = 70.0;
const YIELD_FLOOR: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 0.35 {
            Self::Low
        } else if score < 0.7 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric signals read from one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSignals {
    pub soil_moisture: f64,
    pub vigor_index: f64,
    pub yield_history: f64,
    pub pest_pressure: f64,
}

impl FieldSignals {
    pub fn from_record(record: &FieldRecord) -> Result<Self, AnalysisError> {
        let num = |field: CanonicalField| -> Result<f64, AnalysisError> {
            let raw = record.get(field).trim();
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    AnalysisError::Validation(format!(
                        "field '{}': {} must be a number, got '{raw}'",
                        record.field_id,
                        field.key(),
                    ))
                })
        };

        Ok(Self {
            soil_moisture: num(CanonicalField::SoilMoisture)?,
            vigor_index: num(CanonicalField::VigorIndex)?,
            yield_history: num(CanonicalField::YieldHistory)?,
            pest_pressure: num(CanonicalField::PestPressure)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
}

pub fn assess(s: &FieldSignals) -> RiskAssessment {
    let moisture = clamp01((s.soil_moisture - IDEAL_MOISTURE).abs() / IDEAL_MOISTURE);
    let pest = clamp01(s.pest_pressure / 100.0);
    let vigor = clamp01(((VIGOR_FLOOR - s.vigor_index) / VIGOR_FLOOR).max(0.0));
    let yield_ = clamp01(((YIELD_FLOOR - s.yield_history) / YIELD_FLOOR).max(0.0));

    let score = round2(0.30 * moisture + 0.30 * pest + 0.20 * vigor + 0.20 * yield_);

    RiskAssessment { score, level: RiskLevel::from_score(score) }
}

/// Score a whole batch into the shape the service returns.
pub fn score_records(records: &[FieldRecord]) -> Result<Vec<AnalysedRecord>, AnalysisError> {
    records
        .iter()
        .map(|record| {
            let signals = FieldSignals::from_record(record)?;
            let assessment = assess(&signals);

            let mut extra = Map::new();
            extra.insert("location".into(), json!(record.location));
            extra.insert("soil_moisture".into(), json!(signals.soil_moisture));
            extra.insert("vigor_index".into(), json!(signals.vigor_index));
            extra.insert("yield_history".into(), json!(signals.yield_history));
            extra.insert("pest_pressure".into(), json!(signals.pest_pressure));

            Ok(AnalysedRecord {
                field_id: json!(record.field_id),
                field_name: json!(record.field_name),
                crop: json!(record.crop),
                risk_level: json!(assessment.level.as_str()),
                risk_score: json!(assessment.score),
                extra,
                ..Default::default()
            })
        })
        .collect()
}

/// Offline stand-in for the remote service.
///
/// Replies exactly like the service would, so results flow through the same
/// shape acceptance as a real run. A record with a non-numeric signal fails
/// the whole batch with a `Validation` error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScorer;

impl AnalysisService for LocalScorer {
    fn submit(&self, records: &[FieldRecord]) -> Result<RemoteReply, AnalysisError> {
        let scored = score_records(records)?;
        let body = serde_json::to_string(&scored)
            .map_err(|e| AnalysisError::Validation(format!("cannot encode scored records: {e}")))?;
        log::debug!("local scorer produced {} record(s)", scored.len());
        Ok(RemoteReply::new(200, body))
    }
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Two decimals, rounded from the exact binary value. The f64 nearest 0.345
/// lies just below it, but scaling by 100 first lands on 34.5 and rounds up.
fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}
