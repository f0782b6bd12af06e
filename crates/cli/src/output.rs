//! Command output: human tables and the `--json` shapes.
//!
//! Everything here returns a `String`; `main` owns stdout.

use serde::Serialize;

use fieldrisk_core::{CanonicalField, FieldRecord};
use fieldrisk_recon::matcher::advisory_source;
use fieldrisk_recon::{RiskSummaryEntry, RiskTally, Session, ADVICE_PLACEHOLDER};

use crate::util::render_table;

const MAX_COL: usize = 32;

#[derive(Serialize)]
struct AnalysisReport<'a> {
    file: Option<&'a str>,
    count: usize,
    tally: RiskTally,
    summary: Vec<RiskSummaryEntry<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selection: Option<SelectionOutput<'a>>,
}

#[derive(Serialize)]
struct SelectionOutput<'a> {
    field_id: &'a str,
    found: bool,
    advice: Option<String>,
    /// Result key the advice came from; absent when the placeholder is shown.
    advice_source: Option<&'static str>,
}

pub fn records_json(records: &[FieldRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

pub fn records_table(records: &[FieldRecord]) -> String {
    let headers: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.label()).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| CanonicalField::ALL.iter().map(|f| r.get(*f).to_string()).collect())
        .collect();
    let mut out = render_table(&headers, &rows, MAX_COL);
    out.push_str(&format!("\n{} record(s)\n", records.len()));
    out
}

pub fn analysis_json(session: &Session, with_selection: bool) -> Result<String, serde_json::Error> {
    let selection = if with_selection { selection_output(session) } else { None };
    let report = AnalysisReport {
        file: session.file().map(|f| f.name.as_str()),
        count: session.results().len(),
        tally: session.risk_tally(),
        summary: session.risk_summary(),
        selection,
    };
    serde_json::to_string_pretty(&report)
}

pub fn analysis_table(session: &Session, with_selection: bool) -> String {
    let rows: Vec<Vec<String>> = session
        .results()
        .iter()
        .map(|r| {
            vec![
                r.field_id_string().unwrap_or_default(),
                r.field_name_text(),
                r.crop_text(),
                r.risk_level_text(),
                r.risk_score_text(),
            ]
        })
        .collect();

    let mut out = render_table(&["Field ID", "Field Name", "Crop", "Risk", "Score"], &rows, MAX_COL);
    out.push('\n');
    out.push_str(&tally_line(&session.risk_tally()));
    out.push('\n');

    if with_selection && !session.selection_id().is_empty() {
        out.push('\n');
        match session.selected() {
            Some(record) => {
                let name = record.field_name_text();
                if name.is_empty() {
                    out.push_str(&format!("Selected: {}\n", session.selection_id()));
                } else {
                    out.push_str(&format!("Selected: {} ({})\n", session.selection_id(), name));
                }
                let advice = session.selected_advice().unwrap_or_else(|| ADVICE_PLACEHOLDER.to_string());
                for line in advice.lines() {
                    out.push_str(&format!("  {}\n", line));
                }
            }
            None => {
                out.push_str(&format!("Selected: {} (not in results)\n", session.selection_id()));
            }
        }
    }
    out
}

fn tally_line(t: &RiskTally) -> String {
    let mut line = format!("{} field(s): {} high, {} moderate, {} low", t.total, t.high, t.moderate, t.low);
    if t.other > 0 {
        line.push_str(&format!(", {} other", t.other));
    }
    line
}

fn selection_output(session: &Session) -> Option<SelectionOutput<'_>> {
    let field_id = session.selection_id();
    if field_id.is_empty() {
        return None;
    }
    let selected = session.selected();
    Some(SelectionOutput {
        field_id,
        found: selected.is_some(),
        advice: session.selected_advice(),
        advice_source: selected.and_then(advisory_source).map(|(key, _)| key),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldrisk_recon::{AnalysisError, AnalysisService, RemoteReply, SourceFile, Transition};

    struct Fixed(&'static str);

    impl AnalysisService for Fixed {
        fn submit(&self, _records: &[FieldRecord]) -> Result<RemoteReply, AnalysisError> {
            Ok(RemoteReply::new(200, self.0))
        }
    }

    fn analysed_session(reply: &'static str) -> Session {
        let mut s = Session::new();
        s.apply(Transition::FileSelected(Some(SourceFile::from_path("/data/fields.csv")))).unwrap();
        s.apply(Transition::ParseComplete(vec![FieldRecord { field_id: "1".into(), ..Default::default() }]))
            .unwrap();
        s.run(&Fixed(reply)).unwrap();
        s
    }

    const REPLY: &str = r#"[{"field_id":"1","field_name":"North Lot","crop":"Corn","risk_level":"High","risk_score":82,"advice":"Irrigate within 48h"}]"#;

    #[test]
    fn table_shows_summary_tally_and_advice() {
        let out = analysis_table(&analysed_session(REPLY), true);
        assert!(out.contains("North Lot"));
        assert!(out.contains("1 field(s): 1 high, 0 moderate, 0 low"));
        assert!(out.contains("Selected: 1 (North Lot)\n  Irrigate within 48h\n"));
    }

    #[test]
    fn score_table_omits_selection() {
        let out = analysis_table(&analysed_session(REPLY), false);
        assert!(!out.contains("Selected:"));
    }

    #[test]
    fn stale_selection_is_reported_not_hidden() {
        let mut s = analysed_session(REPLY);
        s.select("9");
        assert!(analysis_table(&s, true).contains("Selected: 9 (not in results)"));

        let v: serde_json::Value = serde_json::from_str(&analysis_json(&s, true).unwrap()).unwrap();
        assert_eq!(v["selection"]["found"], false);
        assert!(v["selection"]["advice"].is_null());
    }

    #[test]
    fn json_report_shape() {
        let v: serde_json::Value =
            serde_json::from_str(&analysis_json(&analysed_session(REPLY), true).unwrap()).unwrap();
        assert_eq!(v["file"], "fields.csv");
        assert_eq!(v["count"], 1);
        assert_eq!(v["tally"]["high"], 1);
        assert_eq!(v["summary"][0]["risk_score"], 82);
        assert_eq!(v["selection"]["field_id"], "1");
        assert_eq!(v["selection"]["advice_source"], "advice");
    }

    #[test]
    fn records_table_uses_canonical_labels() {
        let out = records_table(&[FieldRecord { field_id: "1".into(), crop: "Corn".into(), ..Default::default() }]);
        let header = out.lines().next().unwrap();
        assert!(header.starts_with(CanonicalField::FieldId.label()));
        assert!(out.ends_with("1 record(s)\n"));
    }
}
