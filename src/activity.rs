//! In-app activity buffer for the Activity panel (instead of println/eprintln).

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

const MAX_ENTRIES: usize = 2000;

static ACTIVITY: OnceLock<Mutex<VecDeque<ActivityEntry>>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    pub fn display_class(&self) -> &'static str {
        match self {
            Level::Info => "activity-info",
            Level::Warn => "activity-warn",
            Level::Error => "activity-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub time: String,
    pub level: Level,
    pub message: String,
}

fn buf() -> &'static Mutex<VecDeque<ActivityEntry>> {
    ACTIVITY.get_or_init(|| Mutex::new(VecDeque::new()))
}

/// Append an entry, dropping the oldest once the buffer is full.
/// Safe to call from any thread (e.g. from the server fetch).
pub fn record(level: Level, message: impl Into<String>) {
    let entry = ActivityEntry {
        time: chrono::Utc::now().format("%H:%M:%S%.3f").to_string(),
        level,
        message: message.into(),
    };
    if let Ok(mut v) = buf().lock() {
        push_capped(&mut v, entry, MAX_ENTRIES);
    }
}

fn push_capped(v: &mut VecDeque<ActivityEntry>, entry: ActivityEntry, cap: usize) {
    v.push_back(entry);
    while v.len() > cap {
        v.pop_front();
    }
}

pub fn info(message: impl Into<String>) {
    record(Level::Info, message);
}

pub fn warn(message: impl Into<String>) {
    record(Level::Warn, message);
}

pub fn error(message: impl Into<String>) {
    record(Level::Error, message);
}

/// Take a snapshot of current entries for display. Call from UI.
pub fn snapshot() -> Vec<ActivityEntry> {
    buf()
        .lock()
        .map(|v| v.iter().cloned().collect())
        .unwrap_or_default()
}
