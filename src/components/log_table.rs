use std::collections::HashSet;

use dioxus::prelude::*;

use crate::model::{LogRecord, RowId};

/// Rows whose attribute details are currently shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandedRows(HashSet<RowId>);

impl ExpandedRows {
    pub fn is_expanded(&self, id: RowId) -> bool {
        self.0.contains(&id)
    }

    pub fn toggle(&mut self, id: RowId) {
        if !self.0.remove(&id) {
            self.0.insert(id);
        }
    }
}

#[component]
pub fn LogTable(records: Vec<LogRecord>) -> Element {
    let mut expanded = use_signal(ExpandedRows::default);

    rsx! {
        table { class: "log-table",
            thead {
                tr {
                    th { class: "th-severity", "SEVERITY" }
                    th { class: "th-time", "TIME" }
                    th { class: "th-body", "BODY" }
                }
            }
            tbody {
                for (id, record) in records.into_iter().map(|r| (r.id, r)) {
                    LogRow {
                        key: "{id}",
                        expanded: expanded.read().is_expanded(id),
                        record,
                        on_toggle: move |id: RowId| expanded.write().toggle(id),
                    }
                }
            }
        }
    }
}

#[component]
fn LogRow(record: LogRecord, expanded: bool, on_toggle: EventHandler<RowId>) -> Element {
    let id = record.id;
    let severity = record.severity_label();
    let severity_class = record.tone().display_class();
    let time = record.display_time();
    let row_class = if expanded { "log-row log-row-selected" } else { "log-row" };

    rsx! {
        tr {
            class: "{row_class}",
            onclick: move |_| on_toggle.call(id),
            td { class: "td-severity {severity_class}", "{severity}" }
            td { class: "td-time", "{time}" }
            td { class: "td-body", "{record.body}" }
        }
        if expanded {
            tr { class: "log-details",
                td { colspan: "3", "{record.attributes_summary()}" }
            }
        }
    }
}
