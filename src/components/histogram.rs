use chrono::{DateTime, Utc};
use dioxus::prelude::*;

use crate::config::{X_AXIS_HEIGHT, Y_AXIS_WIDTH};
use crate::histogram::compute_histogram;

const BAR_FILL: &str = "#D2E3FC";
const BAR_STROKE: &str = "#1973E8";
const TICK_SIZE: f64 = 6.0;

/// Log volume per day with a time axis below and a count axis on the left.
#[component]
pub fn HistogramChart(timestamps: Vec<DateTime<Utc>>, width: u32, height: u32) -> Element {
    let histogram = compute_histogram(&timestamps, width, height);
    let bars = histogram.bars();
    let x_ticks = histogram.time_ticks();
    let y_ticks = histogram.count_ticks();
    let (x_start, x_end) = histogram.x_scale.range;
    let (y_bottom, y_top) = histogram.y_scale.range;
    let total_height = height + X_AXIS_HEIGHT;
    let label_gap = TICK_SIZE + 3.0;
    let (y_tick_end, y_label_x) = (-TICK_SIZE, -label_gap);

    let caption = format!(
        "{} records over {} days, peak {} per day",
        histogram.total(),
        histogram.buckets.len(),
        histogram.max_count()
    );

    rsx! {
        p { class: "histogram-caption text-muted text-sm", "{caption}" }
        svg {
            class: "histogram",
            width: "{width}",
            height: "{total_height}",
            for (idx, bar) in bars.into_iter().enumerate() {
                rect {
                    key: "{idx}",
                    fill: BAR_FILL,
                    stroke: BAR_STROKE,
                    x: "{bar.x}",
                    y: "{bar.y}",
                    width: "{bar.width}",
                    height: "{bar.height}",
                }
            }
            g { class: "axis x-axis", transform: "translate(0, {height})",
                line { x1: "{x_start}", x2: "{x_end}", y1: "0", y2: "0" }
                for tick in x_ticks {
                    g { key: "{tick.label}", transform: "translate({tick.position}, 0)",
                        line { y2: "{TICK_SIZE}" }
                        text { class: "tick-label tick-label-x", y: "{label_gap}", "dy": "0.71em", "{tick.label}" }
                    }
                }
            }
            g { class: "axis y-axis", transform: "translate({Y_AXIS_WIDTH}, 0)",
                line { x1: "0", x2: "0", y1: "{y_bottom}", y2: "{y_top}" }
                for tick in y_ticks {
                    g { key: "{tick.label}", transform: "translate(0, {tick.position})",
                        line { x2: "{y_tick_end}" }
                        text { class: "tick-label tick-label-y", x: "{y_label_x}", "dy": "0.32em", "{tick.label}" }
                    }
                }
            }
        }
    }
}
