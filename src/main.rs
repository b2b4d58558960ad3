#![allow(non_snake_case)]

mod activity;
mod api;
mod components;
mod config;
mod histogram;
mod model;
mod otlp;

use dioxus::prelude::*;

use activity::ActivityEntry;
use api::{fetch_logs, FetchLogsResult};
use components::histogram::HistogramChart;
use components::log_table::LogTable;
use model::{LogRecord, SeverityTone};

// ============================================================================
// App state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortOrder {
    OldestFirst,
    NewestFirst,
}

/// Records matching `query` (case-insensitive), in the requested order.
/// `records` must already be sorted oldest first.
fn visible_records(records: &[LogRecord], query: &str, order: SortOrder) -> Vec<LogRecord> {
    let query = query.trim().to_lowercase();
    let mut result: Vec<LogRecord> = records
        .iter()
        .filter(|r| r.matches(&query))
        .cloned()
        .collect();
    if order == SortOrder::NewestFirst {
        result.reverse();
    }
    result
}

/// Copy the server's progress lines into the local activity buffer.
fn record_server_notes(result: &FetchLogsResult) {
    for note in &result.notes {
        activity::info(format!("server: {}", note));
    }
}

/// Kick off one fetch. Failures land in `error` and the activity buffer.
fn load_logs(
    mut records: Signal<Vec<LogRecord>>,
    mut loading: Signal<bool>,
    mut error: Signal<Option<String>>,
) {
    loading.set(true);
    error.set(None);
    spawn(async move {
        activity::info("Fetching logs...");
        match fetch_logs().await {
            Ok(result) => {
                record_server_notes(&result);
                let batch = result.records;
                if batch.is_empty() {
                    activity::warn("Logs endpoint returned no records");
                }
                activity::info(format!("Done. {} log records.", batch.len()));
                records.set(batch);
            }
            Err(e) => {
                activity::error(format!("Logs: {}", e));
                records.set(Vec::new());
                error.set(Some(e.to_string()));
            }
        }
        loading.set(false);
    });
}

// ============================================================================
// Entry & root component
// ============================================================================

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let records = use_signal(Vec::<LogRecord>::new);
    let loading = use_signal(|| true);
    let error = use_signal(|| None::<String>);
    let mut search_query = use_signal(String::new);
    let mut sort_order = use_signal(|| SortOrder::OldestFirst);
    let mut activity_open = use_signal(|| false);
    let mut activity_snapshot = use_signal(Vec::<ActivityEntry>::new);

    use_effect(move || load_logs(records, loading, error));

    let visible = use_memo(move || {
        visible_records(&records.read(), &search_query.read(), *sort_order.read())
    });

    let timestamps = use_memo(move || model::histogram_timestamps(&visible.read()));

    let stats = use_memo(move || {
        let all = records.read();
        let total = all.len();
        let critical = all.iter().filter(|r| r.tone() == SeverityTone::Critical).count();
        let warnings = all.iter().filter(|r| r.tone() == SeverityTone::Warning).count();
        (total, critical, warnings)
    });

    let error_message = error.read().clone().unwrap_or_default();
    let failed = error.read().is_some();
    let have_records = !records.read().is_empty();
    let query = search_query.read().clone();

    rsx! {
        document::Title { "OTLP Log Viewer" }
        document::Stylesheet { href: asset!("/assets/main.css") }

        div { class: "viewer",
            nav { class: "viewer-nav",
                div { class: "flex items-center gap-4",
                    h1 { class: "viewer-title", "OTLP Log Viewer" }
                    div { class: "nav-stats",
                        span { "{stats.read().0} records" }
                        span { class: "severity-critical", "{stats.read().1} errors" }
                        span { class: "severity-warning", "{stats.read().2} warnings" }
                    }
                }
                div { class: "flex items-center gap-2",
                    button {
                        class: "btn",
                        disabled: *loading.read(),
                        onclick: move |_| {
                            activity::info("Refresh requested");
                            load_logs(records, loading, error);
                        },
                        "Refresh"
                    }
                    button {
                        class: "btn",
                        onclick: move |_| {
                            activity_open.set(true);
                            activity_snapshot.set(activity::snapshot());
                        },
                        "Activity"
                    }
                }
            }

            {if *activity_open.read() {
                rsx! {
                    div {
                        class: "overlay",
                        onclick: move |_| activity_open.set(false),
                        div {
                            class: "panel",
                            onclick: move |evt| { evt.stop_propagation(); },
                            h2 { class: "panel-title", "Activity" }
                            p { class: "text-muted text-sm", "Fetch activity for this session, including the server's notes on each fetch. Re-open to refresh." }
                            div { class: "activity-list",
                                for entry in activity_snapshot.read().iter() {
                                    div { class: "activity-line",
                                        span { class: "text-muted mr-2", "{entry.time}" }
                                        span { class: "{entry.level.display_class()}", "{entry.level.as_str()}" }
                                        span { class: "ml-2", "{entry.message}" }
                                    }
                                }
                            }
                            div { class: "flex gap-2 mt-4",
                                button {
                                    class: "btn",
                                    onclick: move |_| activity_snapshot.set(activity::snapshot()),
                                    "Refresh activity"
                                }
                                button {
                                    class: "btn",
                                    onclick: move |_| activity_open.set(false),
                                    "Close"
                                }
                            }
                        }
                    }
                }
            } else {
                rsx! { }
            }}

            div { class: "toolbar",
                input {
                    r#type: "search",
                    class: "search",
                    placeholder: "Filter by severity, body or attribute...",
                    value: "{search_query}",
                    oninput: move |evt| search_query.set(evt.value())
                }
                div { class: "flex items-center gap-2",
                    span { class: "text-muted text-sm", "Order:" }
                    select {
                        class: "select",
                        onchange: move |evt| {
                            match evt.value().as_str() {
                                "oldest" => sort_order.set(SortOrder::OldestFirst),
                                "newest" => sort_order.set(SortOrder::NewestFirst),
                                _ => {}
                            }
                        },
                        option { value: "oldest", "Oldest first" }
                        option { value: "newest", "Newest first" }
                    }
                }
            }

            if *loading.read() {
                div { class: "state-card",
                    p { class: "text-muted", "Loading logs..." }
                }
            } else if failed {
                div { class: "state-card state-error",
                    p { class: "font-semibold", "Could not load logs" }
                    p { class: "text-sm", "{error_message}" }
                }
            } else if !have_records {
                div { class: "state-card",
                    p { class: "text-muted", "No log records" }
                }
            } else if visible.read().is_empty() {
                div { class: "state-card",
                    p { class: "text-muted", "No log records match \"{query}\"" }
                }
            } else {
                HistogramChart {
                    timestamps: timestamps.read().clone(),
                    width: config::CHART_WIDTH,
                    height: config::CHART_HEIGHT,
                }
                LogTable { records: visible.read().clone() }
            }

            footer { class: "viewer-footer text-muted text-sm",
                "Source: {config::logs_url()}"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::RowId;

    fn record(id: usize, severity: &str, body: &str) -> LogRecord {
        LogRecord {
            id: RowId(id),
            time_unix_nano: Some(1_709_251_200_000_000_000 + id as i64),
            severity_text: severity.to_string(),
            severity_number: None,
            body: body.to_string(),
            attributes: vec![],
        }
    }

    fn ids(records: &[LogRecord]) -> Vec<usize> {
        records.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn server_notes_reach_the_activity_panel() {
        let result = FetchLogsResult {
            records: vec![record(0, "INFO", "hello")],
            notes: vec!["Logs: got 1 records (0 without a timestamp) #notes-test".to_string()],
        };
        record_server_notes(&result);
        assert!(activity::snapshot()
            .iter()
            .any(|e| e.message == "server: Logs: got 1 records (0 without a timestamp) #notes-test"));
    }

    #[test]
    fn visible_records_filters_and_orders() {
        let all = vec![
            record(0, "INFO", "cache warmed"),
            record(1, "ERROR", "Cache miss storm"),
            record(2, "WARN", "slow query"),
        ];

        assert_eq!(ids(&visible_records(&all, "", SortOrder::OldestFirst)), vec![0, 1, 2]);
        assert_eq!(ids(&visible_records(&all, "", SortOrder::NewestFirst)), vec![2, 1, 0]);
        assert_eq!(ids(&visible_records(&all, "  CACHE ", SortOrder::OldestFirst)), vec![0, 1]);
        assert_eq!(ids(&visible_records(&all, "error", SortOrder::NewestFirst)), vec![1]);
        assert!(visible_records(&all, "nothing", SortOrder::OldestFirst).is_empty());
    }
}
