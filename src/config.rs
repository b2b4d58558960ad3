//! Endpoint and chart geometry.
//!
//! Everything here is fixed at compile time. `OTLP_LOGS_URL` may be set in a
//! `.env` next to `Cargo.toml`; build.rs forwards it into the build.

/// Logs endpoint used when no override was provided at build time.
pub const DEFAULT_LOGS_URL: &str = "https://take-home-assignment-otlp-logs-api.vercel.app/api/logs";

/// Histogram plot size in logical pixels (the x-axis strip is extra).
pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 300;

/// Space reserved left and right of the time axis for tick labels.
pub const Y_AXIS_WIDTH: u32 = 40;
/// Space reserved below the plot for the time axis labels.
pub const X_AXIS_HEIGHT: u32 = 40;
/// Gap kept above the tallest bar.
pub const TOP_INSET: u32 = 5;

pub fn logs_url() -> &'static str {
    match option_env!("OTLP_LOGS_URL") {
        Some(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_LOGS_URL,
    }
}
