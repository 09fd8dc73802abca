//! Tabular data: time patterns, curves and time series
//!
//! All three spread one record over consecutive lines that repeat the record
//! name, e.g.
//!
//! ```text
//! C1  STORAGE  0  100
//! C1           2  200
//! ```

use crate::inp::coercion::{Value, DATE_FORMAT};
use crate::inp::error::SchemaError;
use crate::inp::lexing::Tokens;
use crate::inp::record::{parse_pairs, Cursor, Field};
use crate::inp::schema::{Grouping, RecordType};
use crate::inp::sections::network::render_f64;
use chrono::NaiveDate;

crate::keyword_enum! {
    pub enum PatternKind {
        Monthly => "MONTHLY",
        Daily => "DAILY",
        Hourly => "HOURLY",
        Weekend => "WEEKEND",
    }
}

/// Multipliers applied to a baseline over a repeating period.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub name: String,
    pub kind: PatternKind,
    pub factors: Vec<f64>,
}

crate::impl_record! {
    Pattern {
        kind: "Pattern",
        identifier: ["Name"],
        fields: { "Name" => name, "Type" => kind, "Factors" => factors },
    }
}

impl RecordType for Pattern {
    const GROUPING: Grouping = Grouping::RepeatedKey;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let name: String = cursor.required("Name")?;
        let kind_token = cursor.next_token().ok_or_else(|| SchemaError::missing("Type"))?;
        let kind = PatternKind::parse(kind_token)
            .ok_or_else(|| SchemaError::UnknownKeyword(kind_token.to_string()))?;

        let mut factors = parse_factors(cursor.rest())?;
        for line in lines.iter().skip(1) {
            factors.extend(parse_factors(&line[1..])?);
        }
        Ok(Pattern {
            name,
            kind,
            factors,
        })
    }
}

fn parse_factors(tokens: &[String]) -> Result<Vec<f64>, SchemaError> {
    tokens
        .iter()
        .map(|token| f64::from_token(token).ok_or_else(|| SchemaError::invalid("Factors", token)))
        .collect()
}

crate::keyword_enum! {
    pub enum CurveKind {
        Storage => "STORAGE",
        Shape => "SHAPE",
        Diversion => "DIVERSION",
        Tidal => "TIDAL",
        Pump1 => "PUMP1",
        Pump2 => "PUMP2",
        Pump3 => "PUMP3",
        Pump4 => "PUMP4",
        Rating => "RATING",
        Control => "CONTROL",
        Weir => "WEIR",
    }
}

/// x/y lookup table. The kind is written on the first line only.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub name: String,
    pub kind: CurveKind,
    pub points: Vec<(f64, f64)>,
}

crate::impl_record! {
    Curve {
        kind: "Curve",
        identifier: ["Name"],
        fields: { "Name" => name, "Type" => kind, "Points" => points },
    }
}

impl RecordType for Curve {
    const GROUPING: Grouping = Grouping::RepeatedKey;
    const TABLE_EXPORT: bool = false;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let name: String = cursor.required("Name")?;
        let kind_token = cursor.next_token().ok_or_else(|| SchemaError::missing("Type"))?;
        let kind = CurveKind::parse(kind_token)
            .ok_or_else(|| SchemaError::UnknownKeyword(kind_token.to_string()))?;

        let mut points = parse_pairs(cursor.rest(), "X", "Y")?;
        for line in lines.iter().skip(1) {
            points.extend(parse_pairs::<f64, f64>(&line[1..], "X", "Y")?);
        }
        Ok(Curve { name, kind, points })
    }

    fn lines(&self) -> Vec<Tokens> {
        if self.points.is_empty() {
            return vec![vec![self.name.clone(), self.kind.to_string()]];
        }
        self.points
            .iter()
            .enumerate()
            .map(|(index, (x, y))| {
                let mut line = vec![self.name.clone()];
                if index == 0 {
                    line.push(self.kind.to_string());
                }
                line.push(render_f64(*x));
                line.push(render_f64(*y));
                line
            })
            .collect()
    }
}

/// One time series observation. `time` is kept as written: clock time,
/// decimal hours or elapsed `H:MM`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesEntry {
    pub date: Option<NaiveDate>,
    pub time: String,
    pub value: f64,
}

impl TimeseriesEntry {
    fn tokens(&self) -> Tokens {
        let mut tokens = Vec::with_capacity(3);
        if let Some(date) = self.date {
            tokens.push(date.format(DATE_FORMAT).to_string());
        }
        tokens.push(self.time.clone());
        tokens.push(render_f64(self.value));
        tokens
    }
}

impl Field for TimeseriesEntry {
    fn from_token(_token: &str) -> Option<Self> {
        None
    }

    fn to_value(&self) -> Value {
        Value::List(vec![
            self.date.to_value(),
            Value::Text(self.time.clone()),
            Value::Float(self.value),
        ])
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) if items.len() == 3 => {
                let mut items = items.into_iter();
                let date = Option::<NaiveDate>::from_value(items.next()?)?;
                let time = items.next()?.render();
                let value = items.next()?.as_f64()?;
                Some(TimeseriesEntry { date, time, value })
            }
            _ => None,
        }
    }
}

/// Time series content: inline observations or an external file.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeseriesData {
    Entries(Vec<TimeseriesEntry>),
    File(String),
}

impl Default for TimeseriesData {
    fn default() -> Self {
        TimeseriesData::Entries(Vec::new())
    }
}

const FILE_KEYWORD: &str = "FILE";

impl Field for TimeseriesData {
    fn from_token(_token: &str) -> Option<Self> {
        None
    }

    fn to_value(&self) -> Value {
        match self {
            TimeseriesData::File(path) => {
                Value::List(vec![Value::from(FILE_KEYWORD), Value::Text(path.clone())])
            }
            TimeseriesData::Entries(entries) => entries.to_value(),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        match value.as_list()? {
            [Value::Text(keyword), path] if keyword.eq_ignore_ascii_case(FILE_KEYWORD) => {
                Some(TimeseriesData::File(path.render()))
            }
            _ => Vec::<TimeseriesEntry>::from_value(value).map(TimeseriesData::Entries),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeseries {
    pub name: String,
    pub data: TimeseriesData,
}

crate::impl_record! {
    Timeseries {
        kind: "Timeseries",
        identifier: ["Name"],
        fields: { "Name" => name, "Data" => data },
    }
}

impl RecordType for Timeseries {
    const GROUPING: Grouping = Grouping::RepeatedKey;
    const TABLE_EXPORT: bool = false;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let name: String = cursor.required("Name")?;

        if cursor
            .peek()
            .is_some_and(|token| token.eq_ignore_ascii_case(FILE_KEYWORD))
        {
            cursor.next_token();
            let path = cursor.rest();
            if path.is_empty() {
                return Err(SchemaError::missing("Fname"));
            }
            if lines.len() > 1 {
                return Err(SchemaError::Malformed(format!(
                    "time series `{name}` reads from a file and cannot also list values"
                )));
            }
            return Ok(Timeseries {
                name,
                data: TimeseriesData::File(path.join(" ")),
            });
        }

        let mut entries = parse_entries(cursor.rest())?;
        for line in lines.iter().skip(1) {
            entries.extend(parse_entries(&line[1..])?);
        }
        Ok(Timeseries {
            name,
            data: TimeseriesData::Entries(entries),
        })
    }

    fn lines(&self) -> Vec<Tokens> {
        match &self.data {
            TimeseriesData::File(path) => vec![vec![
                self.name.clone(),
                FILE_KEYWORD.to_string(),
                path.clone(),
            ]],
            TimeseriesData::Entries(entries) => entries
                .iter()
                .map(|entry| {
                    let mut line = vec![self.name.clone()];
                    line.extend(entry.tokens());
                    line
                })
                .collect(),
        }
    }
}

/// `[date] time value` triples; a token containing `/` is a date.
fn parse_entries(tokens: &[String]) -> Result<Vec<TimeseriesEntry>, SchemaError> {
    let mut cursor = Cursor::new(tokens);
    let mut entries = Vec::new();
    while let Some(first) = cursor.next_token() {
        let (date, time) = if first.contains('/') {
            let date = NaiveDate::parse_from_str(first, DATE_FORMAT)
                .map_err(|_| SchemaError::invalid("Date", first))?;
            let time = cursor.next_token().ok_or_else(|| SchemaError::missing("Time"))?;
            (Some(date), time)
        } else {
            (None, first)
        };
        let value: f64 = cursor.required("Value")?;
        entries.push(TimeseriesEntry {
            date,
            time: time.to_string(),
            value,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inp::record::Record;

    fn line(text: &str) -> Tokens {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_monthly_pattern() {
        let pattern = Pattern::parse(&[line("P1 MONTHLY 1 1 1 1 1 1 1 1 1 1 1 1")]).unwrap();
        assert_eq!(pattern.name, "P1");
        assert_eq!(pattern.kind, PatternKind::Monthly);
        assert_eq!(pattern.factors, vec![1.0; 12]);
        assert_eq!(pattern.get("Type"), Ok(Value::from("MONTHLY")));
        insta::assert_snapshot!(
            pattern.to_tokens()[0].join(" "),
            @"P1 MONTHLY 1 1 1 1 1 1 1 1 1 1 1 1"
        );
    }

    #[test]
    fn test_pattern_continues_on_following_lines() {
        let pattern = Pattern::parse(&[
            line("P2 HOURLY 0.5 0.6 0.7"),
            line("P2 0.8 0.9"),
        ])
        .unwrap();
        assert_eq!(pattern.factors, vec![0.5, 0.6, 0.7, 0.8, 0.9]);
    }

    #[test]
    fn test_pattern_unknown_type() {
        assert_eq!(
            Pattern::parse(&[line("P1 YEARLY 1")]),
            Err(SchemaError::UnknownKeyword("YEARLY".into()))
        );
    }

    #[test]
    fn test_curve_points_across_lines() {
        let curve = Curve::parse(&[line("C1 STORAGE 0 100"), line("C1 2 200")]).unwrap();
        assert_eq!(curve.kind, CurveKind::Storage);
        assert_eq!(curve.points, vec![(0.0, 100.0), (2.0, 200.0)]);
        assert_eq!(
            curve.to_tokens(),
            vec![line("C1 STORAGE 0 100"), line("C1 2 200")]
        );
    }

    #[test]
    fn test_curve_odd_coordinate_count() {
        assert_eq!(
            Curve::parse(&[line("C1 PUMP1 0 100 2")]),
            Err(SchemaError::missing("Y"))
        );
    }

    #[test]
    fn test_timeseries_with_and_without_dates() {
        let series = Timeseries::parse(&[
            line("TS1 01/01/2001 0:00 0.0"),
            line("TS1 1:00 0.5 2:00 0.25"),
        ])
        .unwrap();
        let TimeseriesData::Entries(entries) = &series.data else {
            panic!("expected inline entries");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2001, 1, 1));
        assert_eq!(entries[2].time, "2:00");
        assert_eq!(
            series.to_tokens(),
            vec![
                line("TS1 01/01/2001 0:00 0"),
                line("TS1 1:00 0.5"),
                line("TS1 2:00 0.25")
            ]
        );
    }

    #[test]
    fn test_timeseries_file() {
        let series = Timeseries::parse(&[line("TS2 FILE \"rain data.dat\"")]).unwrap();
        assert_eq!(series.data, TimeseriesData::File("\"rain data.dat\"".into()));
        assert_eq!(series.to_tokens()[0].len(), 3);
    }

    #[test]
    fn test_timeseries_bad_date() {
        assert_eq!(
            Timeseries::parse(&[line("TS1 13/40/2001 0:00 1")]),
            Err(SchemaError::invalid("Date", "13/40/2001"))
        );
    }
}
