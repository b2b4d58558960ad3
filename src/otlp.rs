//! OTLP/JSON logs client: fetch an export batch and flatten it into [crate::model] records.

use serde::{Deserialize, Deserializer};

use crate::model::{AnyValue, Attribute, LogRecord, RowId};

// ---------------------------------------------------------------------------
// OTLP/JSON response types
// ---------------------------------------------------------------------------

// Collections are `Option` so that both a missing key and an explicit `null`
// read as empty.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLogsRequest {
    resource_logs: Option<Vec<ResourceLogs>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceLogs {
    scope_logs: Option<Vec<ScopeLogs>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScopeLogs {
    log_records: Option<Vec<OtlpLogRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OtlpLogRecord {
    #[serde(default, deserialize_with = "de_opt_i64")]
    time_unix_nano: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    observed_time_unix_nano: Option<i64>,
    severity_number: Option<i32>,
    severity_text: Option<String>,
    body: Option<OtlpAnyValue>,
    attributes: Option<Vec<OtlpKeyValue>>,
}

#[derive(Debug, Deserialize)]
struct OtlpKeyValue {
    key: String,
    value: Option<OtlpAnyValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OtlpAnyValue {
    string_value: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    int_value: Option<i64>,
    double_value: Option<f64>,
    bool_value: Option<bool>,
    bytes_value: Option<String>,
    array_value: Option<OtlpArrayValue>,
    kvlist_value: Option<OtlpKvList>,
}

#[derive(Debug, Deserialize)]
struct OtlpArrayValue {
    values: Option<Vec<OtlpAnyValue>>,
}

#[derive(Debug, Deserialize)]
struct OtlpKvList {
    values: Option<Vec<OtlpKeyValue>>,
}

/// OTLP/JSON encodes 64-bit integers as decimal strings, but plenty of
/// producers emit plain numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireInt {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let Some(raw) = Option::<WireInt>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let value = match raw {
        WireInt::Signed(i) => i,
        WireInt::Unsigned(u) => i64::try_from(u).map_err(D::Error::custom)?,
        WireInt::Float(f) => f as i64,
        WireInt::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| D::Error::custom(format!("invalid integer {:?}: {}", s, e)))?,
    };
    Ok(Some(value))
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

impl From<OtlpAnyValue> for AnyValue {
    fn from(v: OtlpAnyValue) -> Self {
        if let Some(s) = v.string_value {
            AnyValue::String(s)
        } else if let Some(i) = v.int_value {
            AnyValue::Int(i)
        } else if let Some(d) = v.double_value {
            AnyValue::Double(d)
        } else if let Some(b) = v.bool_value {
            AnyValue::Bool(b)
        } else if let Some(b) = v.bytes_value {
            AnyValue::Bytes(b)
        } else if let Some(arr) = v.array_value {
            AnyValue::Array(arr.values.unwrap_or_default().into_iter().map(AnyValue::from).collect())
        } else if let Some(kv) = v.kvlist_value {
            AnyValue::KvList(kv.values.unwrap_or_default().into_iter().map(Attribute::from).collect())
        } else {
            AnyValue::Empty
        }
    }
}

impl From<OtlpKeyValue> for Attribute {
    fn from(kv: OtlpKeyValue) -> Self {
        Attribute {
            key: kv.key,
            value: kv.value.map(AnyValue::from).unwrap_or(AnyValue::Empty),
        }
    }
}

fn map_record(r: OtlpLogRecord) -> LogRecord {
    let time_unix_nano = r
        .time_unix_nano
        .filter(|t| *t != 0)
        .or(r.observed_time_unix_nano.filter(|t| *t != 0));
    LogRecord {
        // Real ids are handed out after sorting.
        id: RowId(0),
        time_unix_nano,
        severity_text: r.severity_text.unwrap_or_default(),
        severity_number: r.severity_number,
        body: r.body.map(|b| AnyValue::from(b).to_string()).unwrap_or_default(),
        attributes: r
            .attributes
            .unwrap_or_default()
            .into_iter()
            .map(Attribute::from)
            .collect(),
    }
}

/// Flatten resource -> scope -> record, sort ascending by timestamp (stable,
/// untimed records last) and number the rows in that order.
pub fn flatten(request: ExportLogsRequest) -> Vec<LogRecord> {
    let mut records: Vec<LogRecord> = request
        .resource_logs
        .unwrap_or_default()
        .into_iter()
        .flat_map(|rl| rl.scope_logs.unwrap_or_default())
        .flat_map(|sl| sl.log_records.unwrap_or_default())
        .map(map_record)
        .collect();

    records.sort_by_key(|r| (r.time_unix_nano.is_none(), r.time_unix_nano));
    for (idx, record) in records.iter_mut().enumerate() {
        record.id = RowId(idx);
    }
    records
}

/// Parse an OTLP/JSON export body into sorted, numbered records.
pub fn parse_export(json: &str) -> Result<Vec<LogRecord>, String> {
    let request: ExportLogsRequest = serde_json::from_str(json)
        .map_err(|e| format!("Failed to parse logs response: {}", e))?;
    Ok(flatten(request))
}

/// [`parse_export`] for a raw HTTP body; failures carry a preview of the body.
pub fn parse_response_body(raw_body: &str) -> Result<Vec<LogRecord>, String> {
    parse_export(raw_body).map_err(|e| {
        let preview: String = raw_body.chars().take(500).collect();
        format!("{} | raw preview: {}", e, preview)
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fetch the log batch from the configured endpoint. One request, no caching.
/// Progress lines go to `notes` so the caller can hand them to the client.
#[cfg(feature = "server")]
pub async fn fetch_log_records(notes: &mut Vec<String>) -> Result<Vec<LogRecord>, String> {
    let url = crate::config::logs_url();
    notes.push(format!("Logs: GET {}", url));

    let response = reqwest::Client::new()
        .get(url)
        .header("Cache-Control", "no-cache")
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| format!("Logs request failed: {}", e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Logs API error: {} - {}", status, body));
    }

    let raw_body = response
        .text()
        .await
        .map_err(|e| format!("Logs response read failed: {}", e))?;
    let records = parse_response_body(&raw_body)?;

    let untimed = records.iter().filter(|r| r.time_unix_nano.is_none()).count();
    notes.push(format!("Logs: got {} records ({} without a timestamp)", records.len(), untimed));
    Ok(records)
}
