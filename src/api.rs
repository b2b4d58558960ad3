//! Server functions bridging the client UI to the server-side logs fetch.
//! Callable from both web (WASM) and desktop clients.

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::LogRecord;

/// Result of one logs fetch. `notes` are the server's progress lines, shown
/// in the client's Activity panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchLogsResult {
    pub records: Vec<LogRecord>,
    pub notes: Vec<String>,
}

/// Fetch the log batch, flattened and sorted oldest first.
#[server]
pub async fn fetch_logs() -> Result<FetchLogsResult, ServerFnError> {
    let mut notes = Vec::new();
    let records = crate::otlp::fetch_log_records(&mut notes)
        .await
        .map_err(|e| ServerFnError::new(e))?;
    Ok(FetchLogsResult { records, notes })
}
