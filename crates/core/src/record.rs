use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Canonical record
// ---------------------------------------------------------------------------

/// One normalized input row. Every value is kept as the raw cell text; the
/// remote service is responsible for interpreting the scalar columns.
///
/// Serialized in struct field order, which is also the request body shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub field_id: String,
    pub field_name: String,
    pub location: String,
    pub crop: String,
    pub soil_moisture: String,
    pub vigor_index: String,
    pub yield_history: String,
    pub pest_pressure: String,
}

impl FieldRecord {
    /// Read a canonical field by tag.
    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::FieldId => &self.field_id,
            CanonicalField::FieldName => &self.field_name,
            CanonicalField::Location => &self.location,
            CanonicalField::Crop => &self.crop,
            CanonicalField::SoilMoisture => &self.soil_moisture,
            CanonicalField::VigorIndex => &self.vigor_index,
            CanonicalField::YieldHistory => &self.yield_history,
            CanonicalField::PestPressure => &self.pest_pressure,
        }
    }

    /// Write a canonical field by tag.
    pub fn set(&mut self, field: CanonicalField, value: String) {
        let slot = match field {
            CanonicalField::FieldId => &mut self.field_id,
            CanonicalField::FieldName => &mut self.field_name,
            CanonicalField::Location => &mut self.location,
            CanonicalField::Crop => &mut self.crop,
            CanonicalField::SoilMoisture => &mut self.soil_moisture,
            CanonicalField::VigorIndex => &mut self.vigor_index,
            CanonicalField::YieldHistory => &mut self.yield_history,
            CanonicalField::PestPressure => &mut self.pest_pressure,
        };
        *slot = value;
    }
}

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    FieldId,
    FieldName,
    Location,
    Crop,
    SoilMoisture,
    VigorIndex,
    YieldHistory,
    PestPressure,
}

impl CanonicalField {
    /// All fields, in record (and preview column) order.
    pub const ALL: [CanonicalField; 8] = [
        Self::FieldId,
        Self::FieldName,
        Self::Location,
        Self::Crop,
        Self::SoilMoisture,
        Self::VigorIndex,
        Self::YieldHistory,
        Self::PestPressure,
    ];

    /// Canonical key, as it appears in the request body.
    pub fn key(&self) -> &'static str {
        match self {
            Self::FieldId => "field_id",
            Self::FieldName => "field_name",
            Self::Location => "location",
            Self::Crop => "crop",
            Self::SoilMoisture => "soil_moisture",
            Self::VigorIndex => "vigor_index",
            Self::YieldHistory => "yield_history",
            Self::PestPressure => "pest_pressure",
        }
    }

    /// Normalized header names accepted for this field, highest priority first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::FieldId => &["field_id", "field id"],
            Self::FieldName => &["field_name", "field name"],
            Self::Location => &["location"],
            Self::Crop => &["crop"],
            Self::SoilMoisture => &["soil moisture (%)", "soil_moisture", "soil moisture"],
            Self::VigorIndex => &["vigor index", "vigor_index"],
            Self::YieldHistory => &["yield history", "yield_history"],
            Self::PestPressure => &["pest / disease pressure", "pest_pressure", "disease_pressure"],
        }
    }

    /// Human column label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FieldId => "Field ID",
            Self::FieldName => "Field name",
            Self::Location => "Location",
            Self::Crop => "Crop",
            Self::SoilMoisture => "Soil moisture (%)",
            Self::VigorIndex => "Vigor index",
            Self::YieldHistory => "Yield history",
            Self::PestPressure => "Pest / disease pressure",
        }
    }

    /// Find the canonical field a raw header maps to, if any.
    pub fn from_header(raw: &str) -> Option<Self> {
        let normalized = normalize_header(raw);
        Self::ALL
            .into_iter()
            .find(|f| f.aliases().contains(&normalized.as_str()))
    }

    /// Pick the column index for this field from a normalized header map.
    ///
    /// Presence decides: the first alias that exists as a column wins, even
    /// when that column's cell is empty for a given row.
    pub fn resolve_column(&self, columns: &HashMap<String, usize>) -> Option<usize> {
        self.aliases().iter().find_map(|alias| columns.get(*alias).copied())
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Trim and lower-case a header cell. The only normalization applied before
/// alias lookup.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}
