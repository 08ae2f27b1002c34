// Variable record domain model and value decoding
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type reported by the upstream API for one monitored point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Bool,
    Word,
    Other(String),
}

impl From<String> for DataType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "BOOL" => DataType::Bool,
            "WORD" => DataType::Word,
            _ => DataType::Other(raw),
        }
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Bool => "BOOL".to_string(),
            DataType::Word => "WORD".to_string(),
            DataType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "BOOL"),
            DataType::Word => write!(f, "WORD"),
            DataType::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Raw value as delivered by the upstream API. BOOL and WORD points arrive
/// as text; some endpoints deliver plain JSON numbers for untyped points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            RawValue::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Value decoded once at the ingestion boundary. The data type determines
/// the decode rule; consumers never re-inspect the raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DecodedValue {
    Bool(bool),
    Numeric(f64),
    Raw(String),
}

impl DecodedValue {
    /// Numeric projection used for charting and trend computation.
    pub fn projection(&self) -> f64 {
        match self {
            DecodedValue::Bool(true) => 1.0,
            DecodedValue::Bool(false) => 0.0,
            DecodedValue::Numeric(n) => *n,
            DecodedValue::Raw(_) => 0.0,
        }
    }
}

/// One data point fetched from the upstream API. Records are immutable once
/// fetched; everything downstream derives read-only views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub address: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub data_type: DataType,
    pub value: RawValue,
    pub module: String,
    pub timestamp: String,
}

impl VariableRecord {
    pub fn decode(&self) -> DecodedValue {
        match &self.data_type {
            DataType::Bool => {
                DecodedValue::Bool(matches!(&self.value, RawValue::Text(t) if t == "True"))
            }
            DataType::Word => DecodedValue::Numeric(match &self.value {
                RawValue::Number(n) => *n,
                RawValue::Text(t) => t.trim().parse().unwrap_or(0.0),
            }),
            DataType::Other(_) => match &self.value {
                RawValue::Number(n) => DecodedValue::Numeric(*n),
                RawValue::Text(t) => DecodedValue::Raw(t.clone()),
            },
        }
    }

    pub fn projection(&self) -> f64 {
        self.decode().projection()
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

/// Parse the ISO-ish timestamps the upstream emits, interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok())
}
