//! Shared domain types for log records (used by the UI and by the OTLP fetcher).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Synthetic row identifier, assigned in sorted order when a batch is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// OTLP attribute / body value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    /// Base64 text as it appears on the wire.
    Bytes(String),
    Array(Vec<AnyValue>),
    KvList(Vec<Attribute>),
    Empty,
}

impl fmt::Display for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyValue::String(s) | AnyValue::Bytes(s) => f.write_str(s),
            AnyValue::Int(i) => write!(f, "{}", i),
            AnyValue::Double(d) => write!(f, "{}", d),
            AnyValue::Bool(b) => write!(f, "{}", b),
            AnyValue::Array(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AnyValue::KvList(kvs) => {
                let parts: Vec<String> = kvs.iter().map(|kv| kv.to_string()).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            AnyValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: AnyValue,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// Color bucket for the severity column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityTone {
    Critical,
    Warning,
    Default,
}

impl SeverityTone {
    pub fn from_label(label: &str) -> Self {
        match label {
            "FATAL" | "ERROR" => SeverityTone::Critical,
            "WARN" => SeverityTone::Warning,
            _ => SeverityTone::Default,
        }
    }

    pub fn display_class(&self) -> &'static str {
        match self {
            SeverityTone::Critical => "severity-critical",
            SeverityTone::Warning => "severity-warning",
            SeverityTone::Default => "severity-default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: RowId,
    /// `None` when the record carried neither an event nor an observed time.
    pub time_unix_nano: Option<i64>,
    pub severity_text: String,
    pub severity_number: Option<i32>,
    pub body: String,
    pub attributes: Vec<Attribute>,
}

impl LogRecord {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.time_unix_nano.map(DateTime::from_timestamp_nanos)
    }

    /// Severity text, or a label derived from the OTLP severity number when
    /// the text is missing.
    pub fn severity_label(&self) -> String {
        if !self.severity_text.is_empty() {
            return self.severity_text.clone();
        }
        let label = match self.severity_number {
            Some(1..=4) => "TRACE",
            Some(5..=8) => "DEBUG",
            Some(9..=12) => "INFO",
            Some(13..=16) => "WARN",
            Some(17..=20) => "ERROR",
            Some(21..=24) => "FATAL",
            _ => "",
        };
        label.to_string()
    }

    pub fn tone(&self) -> SeverityTone {
        SeverityTone::from_label(&self.severity_label())
    }

    /// `YYYY-MM-DD HH:MM:SS.mmm` in UTC, or `-` for untimed records.
    pub fn display_time(&self) -> String {
        match self.timestamp() {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            None => "-".to_string(),
        }
    }

    pub fn attributes_summary(&self) -> String {
        if self.attributes.is_empty() {
            return "No additional attributes".to_string();
        }
        self.attributes
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Case-insensitive match against severity, body and attributes.
    /// `query` is expected to be lowercase already.
    pub fn matches(&self, query: &str) -> bool {
        query.is_empty()
            || self.severity_label().to_lowercase().contains(query)
            || self.body.to_lowercase().contains(query)
            || self
                .attributes
                .iter()
                .any(|a| a.to_string().to_lowercase().contains(query))
    }
}

/// Timestamps to bin. Untimed records stay out of the histogram.
pub fn histogram_timestamps(records: &[LogRecord]) -> Vec<DateTime<Utc>> {
    records.iter().filter_map(|r| r.timestamp()).collect()
}
