//! Per-advisor drill-down of individual calls

use crate::dashboard::charts::format_percent;
use crate::data::CallRecord;
use serde::Serialize;
use std::collections::HashMap;

pub const PASS: &str = "✅";
pub const FAIL: &str = "❌";

pub const EMPTY_WARNING: &str = "No hay datos disponibles para mostrar el análisis detallado por asesor.";

/// A call-quality criterion with the minimum count the rubric expects
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChecklistCategory {
    pub key: &'static str,
    pub minimum: u32,
    /// Share of the call score this category carries upstream
    pub weight: f64,
}

pub const CHECKLIST: [ChecklistCategory; 6] = [
    ChecklistCategory { key: "saludo", minimum: 1, weight: 0.05 },
    ChecklistCategory { key: "indagacion", minimum: 4, weight: 0.20 },
    ChecklistCategory { key: "programas", minimum: 3, weight: 0.15 },
    ChecklistCategory { key: "argumentacion", minimum: 20, weight: 0.30 },
    ChecklistCategory { key: "objecion", minimum: 4, weight: 0.20 },
    ChecklistCategory { key: "cierre", minimum: 3, weight: 0.20 },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckLine {
    pub category: String,
    pub count: String,
    pub minimum: u32,
    pub weight: f64,
    pub pass: bool,
}

impl CheckLine {
    /// `Saludo: 1 ✅`
    pub fn text(&self) -> String {
        format!("{}: {} {}", self.category, self.count, glyph(self.pass))
    }

    /// `mín. 1 · peso 5%`
    pub fn hint(&self) -> String {
        format!("mín. {} · peso {}", self.minimum, format_percent(self.weight, 0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallDetail {
    pub archivo: String,
    pub checks: Vec<CheckLine>,
    pub effective: bool,
    pub puntaje: f64,
}

impl CallDetail {
    fn from_record(call: &CallRecord) -> Self {
        let checks = CHECKLIST
            .iter()
            .map(|cat| CheckLine {
                category: capitalize(cat.key),
                count: call.get(cat.key).unwrap_or("0").to_string(),
                minimum: cat.minimum,
                weight: cat.weight,
                pass: is_pass(call.get(&format!("{}_ok", cat.key))),
            })
            .collect();

        Self {
            archivo: call.archivo.clone(),
            checks,
            effective: is_pass(call.get("efectiva")),
            puntaje: call.puntaje.unwrap_or(0.0),
        }
    }

    /// `Resultado: ❌ — Puntaje: 72.3%`
    pub fn result_text(&self) -> String {
        format!("Resultado: {} — Puntaje: {:.1}%", glyph(self.effective), self.puntaje)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisorSection {
    pub asesor: String,
    pub calls: Vec<CallDetail>,
}

impl AdvisorSection {
    /// `👤 A — 3 llamadas`
    pub fn title(&self) -> String {
        format!("👤 {} — {} llamadas", self.asesor, self.calls.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DrillDown {
    Empty { warning: String },
    Sections { sections: Vec<AdvisorSection> },
}

impl DrillDown {
    pub fn sections(&self) -> &[AdvisorSection] {
        match self {
            DrillDown::Empty { .. } => &[],
            DrillDown::Sections { sections } => sections,
        }
    }
}

/// Build the drill-down, or the warning when there are no calls
pub fn build(calls: &[CallRecord]) -> DrillDown {
    if calls.is_empty() {
        log::warn!("No per-call results to show");
        return DrillDown::Empty { warning: EMPTY_WARNING.to_string() };
    }

    let sections = group_by_advisor(calls)
        .into_iter()
        .map(|(asesor, rows)| AdvisorSection {
            asesor: asesor.to_string(),
            calls: rows.into_iter().map(CallDetail::from_record).collect(),
        })
        .collect();

    DrillDown::Sections { sections }
}

/// Group rows by advisor; groups in first-seen order, rows in input order
pub fn group_by_advisor(calls: &[CallRecord]) -> Vec<(&str, Vec<&CallRecord>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&CallRecord>)> = Vec::new();

    for call in calls {
        let slot = *index.entry(call.asesor.as_str()).or_insert_with(|| {
            groups.push((call.asesor.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(call);
    }

    groups
}

pub fn glyph(pass: bool) -> &'static str {
    if pass {
        PASS
    } else {
        FAIL
    }
}

fn is_pass(value: Option<&str>) -> bool {
    value == Some(PASS)
}

/// First letter upper, the rest lower
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_call() -> CallRecord {
        CallRecord::new("A", "x.wav")
            .with_field("saludo", "1")
            .with_field("saludo_ok", "✅")
            .with_field("efectiva", "❌")
            .with_field("puntaje", "72.3")
    }

    // ==========================================================================
    // EMPTY GUARD
    // ==========================================================================

    #[test]
    fn test_empty_results_give_warning_only() {
        let drill = build(&[]);
        assert_eq!(drill, DrillDown::Empty { warning: EMPTY_WARNING.to_string() });
        assert!(drill.sections().is_empty());
    }

    // ==========================================================================
    // ROW RENDERING
    // ==========================================================================

    #[test]
    fn test_scenario_row() {
        let drill = build(&[scenario_call()]);
        let call = &drill.sections()[0].calls[0];

        assert_eq!(call.archivo, "x.wav");
        assert_eq!(call.checks[0].text(), "Saludo: 1 ✅");
        assert_eq!(call.result_text(), "Resultado: ❌ — Puntaje: 72.3%");
    }

    #[test]
    fn test_missing_fields_default_to_fail_and_zero() {
        let drill = build(&[CallRecord::new("A", "y.wav")]);
        let call = &drill.sections()[0].calls[0];

        assert_eq!(call.checks.len(), 6);
        for check in &call.checks {
            assert!(!check.pass);
            assert_eq!(check.count, "0");
        }
        assert_eq!(call.checks[5].text(), "Cierre: 0 ❌");
        assert_eq!(call.result_text(), "Resultado: ❌ — Puntaje: 0.0%");
    }

    #[test]
    fn test_only_exact_pass_symbol_passes() {
        let call = CallRecord::new("A", "z.wav")
            .with_field("cierre_ok", "si")
            .with_field("objecion_ok", "✅ ")
            .with_field("efectiva", "✅");
        let detail = CallDetail::from_record(&call);

        assert!(!detail.checks[5].pass);
        assert!(!detail.checks[4].pass);
        assert!(detail.effective);
    }

    #[test]
    fn test_checklist_order_and_minimums() {
        let names: Vec<&str> = CHECKLIST.iter().map(|c| c.key).collect();
        assert_eq!(names, vec!["saludo", "indagacion", "programas", "argumentacion", "objecion", "cierre"]);

        let minimums: Vec<u32> = CHECKLIST.iter().map(|c| c.minimum).collect();
        assert_eq!(minimums, vec![1, 4, 3, 20, 4, 3]);
    }

    #[test]
    fn test_hint_carries_minimum_and_weight() {
        let detail = CallDetail::from_record(&scenario_call());
        let hints: Vec<String> = detail.checks.iter().map(|c| c.hint()).collect();

        assert_eq!(hints[0], "mín. 1 · peso 5%");
        assert_eq!(hints[2], "mín. 3 · peso 15%");
        assert_eq!(hints[3], "mín. 20 · peso 30%");
    }

    #[test]
    fn test_raw_count_shown_verbatim() {
        let call = CallRecord::new("A", "w.wav").with_field("argumentacion", "21.0");
        let detail = CallDetail::from_record(&call);
        assert_eq!(detail.checks[3].text(), "Argumentacion: 21.0 ❌");
    }

    // ==========================================================================
    // GROUPING
    // ==========================================================================

    #[test]
    fn test_groups_in_first_seen_order() {
        let calls = vec![
            CallRecord::new("Lucia", "1.wav"),
            CallRecord::new("Andres", "2.wav"),
            CallRecord::new("Lucia", "3.wav"),
            CallRecord::new("Carlos", "4.wav"),
            CallRecord::new("Andres", "5.wav"),
        ];
        let groups = group_by_advisor(&calls);

        let order: Vec<&str> = groups.iter().map(|(a, _)| *a).collect();
        assert_eq!(order, vec!["Lucia", "Andres", "Carlos"]);

        let lucia: Vec<&str> = groups[0].1.iter().map(|c| c.archivo.as_str()).collect();
        assert_eq!(lucia, vec!["1.wav", "3.wav"]);
    }

    #[test]
    fn test_section_title_counts_calls() {
        let calls = vec![scenario_call(), scenario_call(), CallRecord::new("B", "q.wav")];
        let drill = build(&calls);

        assert_eq!(drill.sections().len(), 2);
        assert_eq!(drill.sections()[0].title(), "👤 A — 2 llamadas");
        assert_eq!(drill.sections()[1].title(), "👤 B — 1 llamadas");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("indagacion"), "Indagacion");
        assert_eq!(capitalize("CIERRE"), "Cierre");
        assert_eq!(capitalize(""), "");
    }
}
