//! Day-bucket histogram of log volume plus the time and count scales used to
//! draw it.
//!
//! Everything here is pure: the chart component calls [`compute_histogram`]
//! on every render with the visible timestamps and plot size.
//!
//! Days are UTC calendar days. Buckets are right-open, so a timestamp at
//! exactly midnight is counted in the bucket that starts at that midnight.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::config::{TOP_INSET, Y_AXIS_WIDTH};

/// Time-axis ticks fall on days of the month where `(day - 1) % 4 == 0`.
const TIME_TICK_DAY_STRIDE: u32 = 4;
/// Approximate number of count-axis ticks.
const COUNT_TICK_TARGET: u32 = 5;

const TICK_DATE_FORMAT: &str = "%b %d, %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub lower: DateTime<Utc>,
    pub upper: DateTime<Utc>,
    pub count: usize,
}

/// Linear mapping from an instant to a horizontal pixel position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub domain: (DateTime<Utc>, DateTime<Utc>),
    pub range: (f64, f64),
}

impl TimeScale {
    pub fn map(&self, t: DateTime<Utc>) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = nanos_between(d0, d1);
        if span == 0.0 {
            return r0;
        }
        r0 + (r1 - r0) * nanos_between(d0, t) / span
    }

    /// Same as [`TimeScale::map`] but held inside the output range.
    pub fn map_clamped(&self, t: DateTime<Utc>) -> f64 {
        let (r0, r1) = self.range;
        self.map(t).clamp(r0.min(r1), r0.max(r1))
    }
}

/// Linear mapping from a bucket count to a vertical pixel position.
/// The range is inverted: larger counts sit higher on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountScale {
    pub domain: (usize, usize),
    pub range: (f64, f64),
}

impl CountScale {
    pub fn map(&self, count: usize) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (r1 - r0) * (count as f64 - d0 as f64) / (d1 as f64 - d0 as f64)
    }

    pub fn baseline(&self) -> f64 {
        self.range.0
    }
}

/// Bar geometry for one bucket, in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub buckets: Vec<Bucket>,
    pub x_scale: TimeScale,
    pub y_scale: CountScale,
}

/// Bin `timestamps` into UTC calendar days and derive the scales for a
/// `width` x `height` plot. Input order does not matter.
pub fn compute_histogram(timestamps: &[DateTime<Utc>], width: u32, height: u32) -> Histogram {
    let x_range = (
        Y_AXIS_WIDTH as f64,
        (width as f64 - Y_AXIS_WIDTH as f64).max(Y_AXIS_WIDTH as f64),
    );

    let Some((min, max)) = extent(timestamps) else {
        let start = DateTime::UNIX_EPOCH;
        return Histogram {
            buckets: Vec::new(),
            x_scale: TimeScale {
                domain: (start, start + Duration::days(1)),
                range: x_range,
            },
            y_scale: count_scale(0, height),
        };
    };

    let buckets = bin_by_day(timestamps, min, max);

    let domain = if min == max {
        // Zero-width extent: show the whole day so the lone bar has width.
        (buckets[0].lower, buckets[0].upper)
    } else {
        (min, max)
    };

    let max_count = buckets.iter().map(|b| b.count).max().unwrap_or(0);

    Histogram {
        buckets,
        x_scale: TimeScale {
            domain,
            range: x_range,
        },
        y_scale: count_scale(max_count, height),
    }
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.y_scale.domain.1
    }

    /// One rectangle per bucket. Edges outside the time range (first and last
    /// day are usually partial) are pulled in to the plot margins.
    pub fn bars(&self) -> Vec<BarRect> {
        let baseline = self.y_scale.baseline();
        self.buckets
            .iter()
            .map(|b| {
                let x0 = self.x_scale.map_clamped(b.lower);
                let x1 = self.x_scale.map_clamped(b.upper);
                let y = self.y_scale.map(b.count);
                BarRect {
                    x: x0,
                    y,
                    width: (x1 - x0).max(0.0),
                    height: (baseline - y).max(0.0),
                    count: b.count,
                }
            })
            .collect()
    }

    /// Midnights inside the time domain on every fourth day of the month
    /// (1st, 5th, 9th, ...).
    pub fn time_ticks(&self) -> Vec<Tick> {
        let (start, end) = self.x_scale.domain;
        let mut day = start.date_naive();
        if midnight(day) < start {
            day = day.succ_opt().unwrap_or(day);
        }

        let mut ticks = Vec::new();
        while midnight(day) <= end {
            if (day.day() - 1) % TIME_TICK_DAY_STRIDE == 0 {
                let t = midnight(day);
                ticks.push(Tick {
                    position: self.x_scale.map(t),
                    label: t.format(TICK_DATE_FORMAT).to_string(),
                });
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        ticks
    }

    /// Roughly five evenly spaced integer ticks from 0 up to the tallest bar.
    pub fn count_ticks(&self) -> Vec<Tick> {
        let max = self.max_count();
        let step = count_tick_step(max, COUNT_TICK_TARGET);
        (0..=max)
            .step_by(step)
            .map(|v| Tick {
                position: self.y_scale.map(v),
                label: v.to_string(),
            })
            .collect()
    }
}

fn extent(timestamps: &[DateTime<Utc>]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let min = timestamps.iter().min()?;
    let max = timestamps.iter().max()?;
    Some((*min, *max))
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// One bucket per calendar day from `min`'s day to `max`'s day, inclusive.
fn bin_by_day(timestamps: &[DateTime<Utc>], min: DateTime<Utc>, max: DateTime<Utc>) -> Vec<Bucket> {
    let first_day = min.date_naive();
    let days = (max.date_naive() - first_day).num_days().max(0) as usize + 1;

    let mut buckets: Vec<Bucket> = (0..days)
        .map(|i| {
            let lower = midnight(first_day) + Duration::days(i as i64);
            Bucket {
                lower,
                upper: lower + Duration::days(1),
                count: 0,
            }
        })
        .collect();

    let last = buckets.len() - 1;
    for t in timestamps {
        let offset = (t.date_naive() - first_day).num_days();
        let idx = offset.clamp(0, last as i64) as usize;
        buckets[idx].count += 1;
    }
    buckets
}

fn count_scale(max_count: usize, height: u32) -> CountScale {
    CountScale {
        domain: (0, max_count),
        range: (height as f64, TOP_INSET as f64),
    }
}

fn nanos_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_nanoseconds() {
        Some(n) => n as f64,
        None => delta.num_milliseconds() as f64 * 1e6,
    }
}

/// Step of 1, 2 or 5 times a power of ten giving about `target` ticks over
/// `[0, max]`. Never below 1 since counts are integers.
fn count_tick_step(max: usize, target: u32) -> usize {
    if max == 0 || target == 0 {
        return 1;
    }
    let raw = max as f64 / target as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    ((factor * power).round() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const W: u32 = 800;
    const H: u32 = 300;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn contains(b: &Bucket, t: DateTime<Utc>) -> bool {
        b.lower <= t && t < b.upper
    }

    fn assert_partition(hist: &Histogram, input: &[DateTime<Utc>]) {
        for pair in hist.buckets.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
        }
        for b in &hist.buckets {
            assert_eq!(b.upper - b.lower, Duration::days(1));
            assert_eq!(b.lower.time(), NaiveTime::MIN);
        }
        assert_eq!(hist.total(), input.len());
        for t in input {
            assert_eq!(hist.buckets.iter().filter(|b| contains(b, *t)).count(), 1);
        }
    }

    #[test]
    fn gap_day_gets_an_empty_bucket() {
        let input = [at(2024, 3, 1, 10, 0), at(2024, 3, 1, 14, 0), at(2024, 3, 3, 9, 0)];
        let hist = compute_histogram(&input, W, H);

        let counts: Vec<usize> = hist.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![2, 0, 1]);
        assert_eq!(hist.buckets[0].lower, at(2024, 3, 1, 0, 0));
        assert_eq!(hist.buckets[2].upper, at(2024, 3, 4, 0, 0));
        assert_partition(&hist, &input);
    }

    #[test]
    fn input_order_does_not_matter() {
        let sorted = [at(2024, 3, 1, 10, 0), at(2024, 3, 2, 14, 0), at(2024, 3, 5, 9, 0)];
        let shuffled = [sorted[2], sorted[0], sorted[1]];
        assert_eq!(compute_histogram(&sorted, W, H), compute_histogram(&shuffled, W, H));
    }

    #[test]
    fn midnight_belongs_to_the_later_day() {
        let input = [at(2024, 3, 1, 23, 0), at(2024, 3, 2, 0, 0)];
        let hist = compute_histogram(&input, W, H);
        let counts: Vec<usize> = hist.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1]);
        assert_partition(&hist, &input);
    }

    #[test]
    fn month_boundary_and_many_records() {
        let mut input = Vec::new();
        for day in 25..=31 {
            for hour in [0, 6, 12, 23] {
                input.push(at(2024, 1, day, hour, 30));
            }
        }
        input.push(at(2024, 2, 2, 8, 0));
        let hist = compute_histogram(&input, W, H);
        assert_eq!(hist.buckets.len(), 9);
        assert_eq!(hist.max_count(), 4);
        assert_partition(&hist, &input);
    }

    #[test]
    fn empty_input_is_defined() {
        let hist = compute_histogram(&[], W, H);
        assert!(hist.buckets.is_empty());
        assert!(hist.bars().is_empty());
        assert_eq!(hist.total(), 0);

        let (d0, d1) = hist.x_scale.domain;
        assert!(d1 > d0);
        let x = hist.x_scale.map(d0 + Duration::hours(12));
        assert!(x.is_finite());
        assert_eq!(hist.y_scale.map(0), H as f64);
        assert_eq!(hist.y_scale.map(10), H as f64);

        let ticks = hist.count_ticks();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].label, "0");
    }

    #[test]
    fn identical_timestamps_render_one_full_bar() {
        let t = at(2024, 3, 9, 15, 45);
        let input = [t, t, t, t];
        let hist = compute_histogram(&input, W, H);

        assert_eq!(hist.buckets.len(), 1);
        assert_eq!(hist.buckets[0].count, 4);
        let (d0, d1) = hist.x_scale.domain;
        assert!(d1 > d0);

        let bars = hist.bars();
        assert_eq!(bars.len(), 1);
        assert!((bars[0].x - 40.0).abs() < 1e-9);
        assert!((bars[0].width - 720.0).abs() < 1e-9);
        assert!((bars[0].y - TOP_INSET as f64).abs() < 1e-9);
        assert!(bars[0].height > 0.0);
        assert!(bars[0].x.is_finite() && bars[0].width.is_finite());
    }

    #[test]
    fn time_scale_maps_extent_to_margins() {
        let input = [at(2024, 3, 1, 10, 0), at(2024, 3, 3, 9, 0)];
        let hist = compute_histogram(&input, W, H);
        let s = hist.x_scale;
        assert!((s.map(input[0]) - 40.0).abs() < 1e-9);
        assert!((s.map(input[1]) - 760.0).abs() < 1e-9);

        let mut prev = f64::NEG_INFINITY;
        for h in 0..48 {
            let x = s.map(input[0] + Duration::hours(h));
            assert!(x >= prev);
            prev = x;
        }
    }

    #[test]
    fn count_scale_maps_zero_and_max() {
        let input = [at(2024, 3, 1, 10, 0), at(2024, 3, 1, 11, 0), at(2024, 3, 2, 9, 0)];
        let hist = compute_histogram(&input, W, H);
        assert_eq!(hist.y_scale.map(0), H as f64);
        assert_eq!(hist.y_scale.map(2), TOP_INSET as f64);
        assert!((hist.y_scale.map(1) - 152.5).abs() < 1e-9);
    }

    #[test]
    fn bars_stay_inside_the_plot() {
        let input = [at(2024, 3, 1, 18, 0), at(2024, 3, 2, 12, 0), at(2024, 3, 4, 3, 0)];
        let hist = compute_histogram(&input, W, H);
        let bars = hist.bars();
        assert_eq!(bars.len(), 4);
        for bar in &bars {
            assert!(bar.x >= 40.0);
            assert!(bar.x + bar.width <= 760.0 + 1e-9);
            assert!(bar.y >= TOP_INSET as f64);
            assert!((bar.y + bar.height - H as f64).abs() < 1e-9);
        }
        for pair in bars.windows(2) {
            assert!((pair[0].x + pair[0].width - pair[1].x).abs() < 1e-9);
        }
        // Empty third day has no height.
        assert_eq!(bars[2].height, 0.0);
    }

    #[test]
    fn time_ticks_every_fourth_day_of_month() {
        let input = [at(2024, 2, 26, 12, 0), at(2024, 3, 12, 12, 0)];
        let hist = compute_histogram(&input, W, H);
        let labels: Vec<String> = hist.time_ticks().into_iter().map(|t| t.label).collect();
        assert_eq!(
            labels,
            vec!["Feb 29, 2024", "Mar 01, 2024", "Mar 05, 2024", "Mar 09, 2024"]
        );
        for tick in hist.time_ticks() {
            assert!(tick.position >= 40.0 && tick.position <= 760.0);
        }
    }

    #[test]
    fn time_ticks_on_degenerate_domains() {
        let lone = compute_histogram(&[at(2024, 3, 5, 15, 0)], W, H);
        let ticks = lone.time_ticks();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].label, "Mar 05, 2024");
        assert!((ticks[0].position - 40.0).abs() < 1e-9);

        // The widened day (6th to 7th) holds no tick day.
        let off_stride = compute_histogram(&[at(2024, 3, 6, 15, 0)], W, H);
        assert!(off_stride.time_ticks().is_empty());

        let empty = compute_histogram(&[], W, H);
        let labels: Vec<String> = empty.time_ticks().into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["Jan 01, 1970"]);
    }

    #[test]
    fn count_ticks_are_nice_integers() {
        let input: Vec<DateTime<Utc>> = (0..23).map(|m| at(2024, 3, 1, 1, m)).collect();
        let hist = compute_histogram(&input, W, H);
        let labels: Vec<String> = hist.count_ticks().into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["0", "5", "10", "15", "20"]);

        let small = compute_histogram(&[at(2024, 3, 1, 1, 0), at(2024, 3, 1, 2, 0)], W, H);
        let labels: Vec<String> = small.count_ticks().into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["0", "1", "2"]);
    }

    #[test]
    fn tick_step_choices() {
        assert_eq!(count_tick_step(0, 5), 1);
        assert_eq!(count_tick_step(3, 5), 1);
        assert_eq!(count_tick_step(10, 5), 2);
        assert_eq!(count_tick_step(40, 5), 10);
        assert_eq!(count_tick_step(100, 5), 20);
        assert_eq!(count_tick_step(1000, 5), 200);
    }

    #[test]
    fn recompute_is_idempotent() {
        let input = [at(2024, 3, 1, 10, 0), at(2024, 3, 7, 9, 0)];
        assert_eq!(compute_histogram(&input, W, H), compute_histogram(&input, W, H));
    }
}
