//! Token ↔ value conversion
//!
//! [`infer`] turns a raw token into the most specific [`Value`] it can hold and
//! [`render`] writes a value back in the file's canonical form. Inference is
//! total: anything that is not a keyword, number, date or time is text.
//!
//! Canonical forms:
//!
//! - `YES` / `NO` for booleans, `NONE` for the null keyword
//! - integers in plain decimal
//! - floats with five significant digits, trailing zeros dropped, `0` for zero
//!   and the empty string for NaN
//! - dates as `MM/DD/YYYY`, times and durations as `HH:MM:SS`
//! - lists space-joined

use crate::inp::error::{CoercionWarning, TokenShape};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

pub const DATE_FORMAT: &str = "%m/%d/%Y";
pub const TIME_FORMAT: &str = "%H:%M:%S";
const SIGNIFICANT_DIGITS: usize = 5;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").expect("integer pattern"));
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:(?:\d+\.\d*|\.\d+)(?:[eE][+-]?\d+)?|\d+[eE][+-]?\d+)$")
        .expect("float pattern")
});
static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+/\d+/\d+$").expect("date pattern"));
static TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}(?::\d{2})?$").expect("time pattern"));
static NUMERIC_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[\d.:/]*\d[\d.:/]*$").expect("numeric pattern"));

/// A typed field value.
///
/// `Int` and `Float` compare by numeric value, so a float written as `1` and
/// read back as an integer is still the same value.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    /// The literal `NONE` keyword.
    Null,
    /// An optional field that was not supplied; renders as nothing.
    Missing,
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(TimeDelta),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Canonical textual form. See [`render`].
    pub fn render(&self) -> String {
        match self {
            Value::Bool(true) => "YES".to_string(),
            Value::Bool(false) => "NO".to_string(),
            Value::Null => "NONE".to_string(),
            Value::Missing => String::new(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format_significant(*value, SIGNIFICANT_DIGITS),
            Value::Date(date) => date.format(DATE_FORMAT).to_string(),
            Value::Time(time) => time.format(TIME_FORMAT).to_string(),
            Value::Duration(delta) => render_duration(delta),
            Value::Text(text) => text.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::render)
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Missing => "missing",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Duration(_) => "duration",
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Missing, Value::Missing) => true,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<TimeDelta> for Value {
    fn from(value: TimeDelta) -> Self {
        Value::Duration(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Null | Value::Missing => serializer.serialize_none(),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) if value.is_finite() => serializer.serialize_f64(*value),
            Value::Float(_) => serializer.serialize_none(),
            Value::Date(_) | Value::Time(_) | Value::Duration(_) => {
                serializer.serialize_str(&self.render())
            }
            Value::Text(text) => serializer.serialize_str(text),
            Value::List(items) => serializer.collect_seq(items),
        }
    }
}

/// Infer the value of a single token. Never fails.
///
/// Tokens that look numeric or temporal but do not parse are kept as text and
/// reported through `tracing`.
pub fn infer(token: &str) -> Value {
    let (value, warning) = infer_checked(token);
    if let Some(warning) = warning {
        tracing::warn!(%warning, "keeping token as text");
    }
    value
}

/// [`infer`] without logging; the warning, if any, is handed back to the caller.
pub fn infer_checked(token: &str) -> (Value, Option<CoercionWarning>) {
    match token {
        "YES" => return (Value::Bool(true), None),
        "NO" => return (Value::Bool(false), None),
        "NONE" => return (Value::Null, None),
        _ => {}
    }

    if INTEGER.is_match(token) {
        return match token.parse::<i64>() {
            Ok(value) => (Value::Int(value), None),
            Err(_) => fallback(token, TokenShape::Integer),
        };
    }
    if FLOAT.is_match(token) {
        return match token.parse::<f64>() {
            Ok(value) => (Value::Float(value), None),
            Err(_) => fallback(token, TokenShape::Float),
        };
    }
    if DATE.is_match(token) {
        return match NaiveDate::parse_from_str(token, DATE_FORMAT) {
            Ok(date) => (Value::Date(date), None),
            Err(_) => fallback(token, TokenShape::Date),
        };
    }
    if TIME.is_match(token) {
        let format = if token.matches(':').count() == 2 {
            TIME_FORMAT
        } else {
            "%H:%M"
        };
        return match NaiveTime::parse_from_str(token, format) {
            Ok(time) => (Value::Time(time), None),
            Err(_) => fallback(token, TokenShape::Time),
        };
    }
    if NUMERIC_LIKE.is_match(token) {
        return fallback(token, TokenShape::Numeric);
    }
    (Value::Text(token.to_string()), None)
}

fn fallback(token: &str, shape: TokenShape) -> (Value, Option<CoercionWarning>) {
    let warning = CoercionWarning {
        token: token.to_string(),
        shape,
    };
    (Value::Text(token.to_string()), Some(warning))
}

/// Canonical textual form of a value.
pub fn render(value: &Value) -> String {
    value.render()
}

/// Format like C's `%.{digits}G`: fixed notation for moderate exponents,
/// `1.2346E+08` style otherwise, trailing zeros removed.
pub fn format_significant(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if value.is_nan() {
        return String::new();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}E{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn render_duration(delta: &TimeDelta) -> String {
    let total = delta.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!(
        "{sign}{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
