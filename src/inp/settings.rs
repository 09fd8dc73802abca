//! Key/value settings sections
//!
//! OPTIONS, REPORT, EVAPORATION and friends hold one setting per line rather
//! than records: a label (one or two tokens) followed by its value tokens. The
//! [`SettingsKind`] of a section decides how labels are formed, which labels
//! accumulate across repeated lines and which value counts are acceptable.

use crate::inp::coercion::{infer, Value};
use crate::inp::error::SchemaError;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKind {
    Options,
    Report,
    Evaporation,
    Temperature,
    Map,
    Files,
    Adjustments,
    Backdrop,
}

const EVAPORATION_METHODS: [&str; 5] = ["CONSTANT", "MONTHLY", "TIMESERIES", "TEMPERATURE", "FILE"];
const REPORT_LISTS: [&str; 3] = ["SUBCATCHMENTS", "NODES", "LINKS"];
const REPORT_LID: &str = "LID";

impl SettingsKind {
    pub const ALL: [SettingsKind; 8] = [
        SettingsKind::Options,
        SettingsKind::Report,
        SettingsKind::Evaporation,
        SettingsKind::Temperature,
        SettingsKind::Map,
        SettingsKind::Files,
        SettingsKind::Adjustments,
        SettingsKind::Backdrop,
    ];

    pub fn section_name(&self) -> &'static str {
        match self {
            SettingsKind::Options => "OPTIONS",
            SettingsKind::Report => "REPORT",
            SettingsKind::Evaporation => "EVAPORATION",
            SettingsKind::Temperature => "TEMPERATURE",
            SettingsKind::Map => "MAP",
            SettingsKind::Files => "FILES",
            SettingsKind::Adjustments => "ADJUSTMENTS",
            SettingsKind::Backdrop => "BACKDROP",
        }
    }

    /// Number of leading tokens forming the label of a line.
    fn label_width(&self, first: &str) -> usize {
        match self {
            SettingsKind::Temperature
                if first.eq_ignore_ascii_case("ADC") || first.eq_ignore_ascii_case("WINDSPEED") =>
            {
                2
            }
            SettingsKind::Files => 2,
            _ => 1,
        }
    }

    fn check_count(&self, label: &str, count: usize) -> Result<(), SchemaError> {
        let label = label.to_ascii_uppercase();
        let allowed: &[usize] = match (self, label.as_str()) {
            (SettingsKind::Evaporation, "MONTHLY") => &[12],
            (SettingsKind::Evaporation, "FILE") => &[0, 12],
            (SettingsKind::Evaporation, "TEMPERATURE") => &[0],
            (SettingsKind::Temperature, "WINDSPEED MONTHLY") => &[12],
            (SettingsKind::Temperature, "SNOWMELT") => &[6],
            (SettingsKind::Temperature, "ADC IMPERVIOUS" | "ADC PERVIOUS") => &[10],
            (SettingsKind::Map, "DIMENSIONS") | (SettingsKind::Backdrop, "DIMENSIONS") => &[4],
            (SettingsKind::Evaporation, _) | (SettingsKind::Temperature, _) => return Ok(()),
            _ if count == 0 => return Err(SchemaError::missing(label)),
            _ => return Ok(()),
        };
        if allowed.contains(&count) {
            Ok(())
        } else {
            Err(SchemaError::Malformed(format!(
                "`{label}` takes {allowed:?} values, found {count}"
            )))
        }
    }
}

/// Ordered settings of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsSection {
    kind: SettingsKind,
    entries: IndexMap<String, Value>,
}

impl SettingsSection {
    pub fn new(kind: SettingsKind) -> Self {
        SettingsSection {
            kind,
            entries: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> SettingsKind {
        self.kind
    }

    pub fn get(&self, label: &str) -> Option<&Value> {
        self.entries.get(label)
    }

    /// Set a value, keeping the position of an existing label.
    pub fn set(&mut self, label: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(label.into(), value.into())
    }

    pub fn remove(&mut self, label: &str) -> Option<Value> {
        self.entries.shift_remove(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(label, value)| (label.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absorb one source line.
    pub fn push_tokens(&mut self, tokens: &[String]) -> Result<(), SchemaError> {
        let Some(first) = tokens.first() else {
            return Ok(());
        };
        let width = self.kind.label_width(first);
        if tokens.len() < width {
            return Err(SchemaError::missing(format!("{first} type")));
        }
        let label = tokens[..width].join(" ");
        let values = &tokens[width..];
        self.kind.check_count(&label, values.len())?;

        if self.kind == SettingsKind::Report {
            return self.push_report(label, values);
        }

        let value = match values {
            [] => Value::Missing,
            [single] => infer(single),
            many => Value::List(many.iter().map(|token| infer(token)).collect()),
        };
        self.entries.insert(label, value);
        Ok(())
    }

    fn push_report(&mut self, label: String, values: &[String]) -> Result<(), SchemaError> {
        let upper = label.to_ascii_uppercase();
        let items: Vec<Value> = values.iter().map(|token| infer(token)).collect();

        if upper == REPORT_LID {
            if items.len() != 3 {
                return Err(SchemaError::Malformed(format!(
                    "`LID` takes a control name, subcatchment and file name, found {} values",
                    items.len()
                )));
            }
            let entry = self
                .entries
                .entry(label)
                .or_insert_with(|| Value::List(Vec::new()));
            if let Value::List(list) = entry {
                list.push(Value::List(items));
            }
            return Ok(());
        }

        let is_scalar = matches!(values, [single] if single == "ALL" || single == "NONE");
        if REPORT_LISTS.contains(&upper.as_str()) && !is_scalar {
            match self.entries.get_mut(&label) {
                Some(Value::List(list)) => list.extend(items),
                _ => {
                    self.entries.insert(label, Value::List(items));
                }
            }
            return Ok(());
        }

        let value = match items.len() {
            1 => items.into_iter().next().unwrap_or(Value::Missing),
            _ => Value::List(items),
        };
        self.entries.insert(label, value);
        Ok(())
    }

    /// Section-level checks once all lines are in.
    pub fn finish(&mut self) -> Result<(), SchemaError> {
        if self.kind != SettingsKind::Evaporation {
            return Ok(());
        }
        let methods: Vec<&str> = self
            .entries
            .keys()
            .map(String::as_str)
            .filter(|label| {
                EVAPORATION_METHODS
                    .iter()
                    .any(|method| label.eq_ignore_ascii_case(method))
            })
            .collect();
        match methods.len() {
            0 => {
                self.entries
                    .shift_insert(0, EVAPORATION_METHODS[0].to_string(), Value::Int(0));
                Ok(())
            }
            1 => Ok(()),
            _ => Err(SchemaError::ConflictingEntries(methods.join(", "))),
        }
    }

    /// Source lines, labels padded to a common width.
    pub fn lines(&self, items_per_line: usize) -> Vec<String> {
        let width = self
            .entries
            .keys()
            .map(|label| label.chars().count())
            .max()
            .unwrap_or(0)
            + 2;
        let items_per_line = items_per_line.max(1);

        let mut lines = Vec::new();
        for (label, value) in &self.entries {
            let mut push = |text: String| {
                let line = format!("{label:<width$}{text}");
                lines.push(line.trim_end().to_string());
            };
            match value {
                Value::List(items)
                    if self.kind == SettingsKind::Report
                        && !items.is_empty()
                        && items.iter().all(|item| matches!(item, Value::List(_))) =>
                {
                    for item in items {
                        push(item.render());
                    }
                }
                Value::List(items) if self.kind == SettingsKind::Report && items.len() > items_per_line => {
                    for chunk in items.chunks(items_per_line) {
                        push(Value::List(chunk.to_vec()).render());
                    }
                }
                other => push(other.render()),
            }
        }
        lines
    }
}

impl Serialize for SettingsSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    fn section(kind: SettingsKind, text: &str) -> Result<SettingsSection, SchemaError> {
        let mut section = SettingsSection::new(kind);
        for line in text.lines() {
            section.push_tokens(&tokens(line))?;
        }
        section.finish()?;
        Ok(section)
    }

    #[test]
    fn test_options_single_values() {
        let options = section(
            SettingsKind::Options,
            "FLOW_UNITS CFS\nALLOW_PONDING NO\nROUTING_STEP 0:00:20\nMIN_SLOPE 0",
        )
        .unwrap();
        assert_eq!(options.get("FLOW_UNITS"), Some(&Value::from("CFS")));
        assert_eq!(options.get("ALLOW_PONDING"), Some(&Value::Bool(false)));
        assert_eq!(options.get("MIN_SLOPE"), Some(&Value::Int(0)));
        assert_eq!(options.len(), 4);
    }

    #[test]
    fn test_options_require_a_value() {
        assert_eq!(
            section(SettingsKind::Options, "FLOW_UNITS"),
            Err(SchemaError::missing("FLOW_UNITS"))
        );
    }

    #[test]
    fn test_report_lists_accumulate() {
        let report = section(
            SettingsKind::Report,
            "INPUT NO\nNODES J1 J2\nNODES J3\nLINKS ALL\nLID L1 S1 out.txt\nLID L2 S2 out2.txt",
        )
        .unwrap();
        assert_eq!(
            report.get("NODES"),
            Some(&Value::List(vec!["J1".into(), "J2".into(), "J3".into()]))
        );
        assert_eq!(report.get("LINKS"), Some(&Value::from("ALL")));
        assert_eq!(report.get("LID").and_then(Value::as_list).map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_report_wraps_long_lists() {
        let names: Vec<String> = (1..=5).map(|i| format!("J{i}")).collect();
        let report = section(SettingsKind::Report, &format!("NODES {}", names.join(" "))).unwrap();
        assert_eq!(
            report.lines(2),
            vec!["NODES  J1 J2", "NODES  J3 J4", "NODES  J5"]
        );
    }

    #[test]
    fn test_evaporation_defaults_to_constant_zero() {
        let evaporation = section(SettingsKind::Evaporation, "DRY_ONLY NO").unwrap();
        assert_eq!(evaporation.get("CONSTANT"), Some(&Value::Int(0)));
        assert_eq!(evaporation.iter().next().map(|(label, _)| label), Some("CONSTANT"));
    }

    #[test]
    fn test_evaporation_rejects_two_methods() {
        let result = section(SettingsKind::Evaporation, "CONSTANT 0.1\nTEMPERATURE");
        assert!(matches!(result, Err(SchemaError::ConflictingEntries(_))));
    }

    #[test]
    fn test_evaporation_monthly_needs_twelve() {
        let result = section(SettingsKind::Evaporation, "MONTHLY 1 2 3");
        assert!(matches!(result, Err(SchemaError::Malformed(_))));
    }

    #[test]
    fn test_temperature_two_token_labels() {
        let temperature = section(
            SettingsKind::Temperature,
            "TIMESERIES T1\nWINDSPEED FILE\nADC IMPERVIOUS 1 1 1 1 1 1 1 1 1 1",
        )
        .unwrap();
        assert_eq!(temperature.get("WINDSPEED FILE"), Some(&Value::Missing));
        assert!(temperature.contains("ADC IMPERVIOUS"));
    }

    #[test]
    fn test_lines_pad_labels() {
        let map = section(SettingsKind::Map, "DIMENSIONS 0 0 100 100\nUNITS None").unwrap();
        assert_eq!(
            map.lines(20),
            vec!["DIMENSIONS  0 0 100 100", "UNITS       None"]
        );
    }
}
