//! Age heatmap computation over parsed blame data
//!
//! Maps per-line commit timestamps to a normalized age ratio and a gradient
//! color, then groups lines into a bounded number of equal-width age buckets
//! so a rendering surface applies a fixed number of styles no matter how many
//! distinct timestamps exist.
//!
//! Global invariants enforced:
//! - Uncommitted lines and lines with unknown timestamps are excluded
//! - All lines sharing one timestamp get age_ratio 0 (no division by zero)
//! - Bucket indices are always strictly less than the bucket count
//! - Derived, ephemeral data: recomputed per request, never cached

use crate::blame::BlameReport;
use crate::color::{hsl_to_rgba, Rgba};
use crate::config::ResolvedConfig;
use serde::Serialize;
use std::collections::BTreeMap;

/// Age datum for one committed line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HeatmapLineDatum {
    pub line_number: u32,
    /// 0 = oldest committed line, 1 = newest
    pub age_ratio: f64,
    pub color: Rgba,
    /// Seconds since epoch
    pub timestamp: i64,
}

/// One age bucket sharing a single rendered color
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HeatmapBucket {
    pub color: Rgba,
    pub line_numbers: Vec<u32>,
}

/// Hue for an age ratio: direct linear interpolation from cold to hot.
///
/// Deliberately not shortest-arc, so the default blue-to-teal sweep does not
/// pass through unrelated hues.
fn hue_for_ratio(ratio: f64, config: &ResolvedConfig) -> f64 {
    config.heatmap_cold_hue + (config.heatmap_hot_hue - config.heatmap_cold_hue) * ratio
}

/// Compute per-line age data for all committed lines of a report.
///
/// Lines with an unknown timestamp (0) carry no age information and are
/// excluded along with uncommitted lines. Returns an empty list when no
/// committed line with a known timestamp exists. When every included line
/// shares one timestamp, all age ratios are 0.
pub fn heatmap(report: &BlameReport, config: &ResolvedConfig) -> Vec<HeatmapLineDatum> {
    let committed: Vec<(u32, i64)> = report
        .lines
        .values()
        .filter(|record| !record.is_uncommitted && record.author_timestamp != 0)
        .map(|record| (record.line_number, record.author_timestamp))
        .collect();

    let Some(&(_, first_time)) = committed.first() else {
        return Vec::new();
    };

    let min_time = committed.iter().map(|&(_, t)| t).min().unwrap_or(first_time);
    let max_time = committed.iter().map(|&(_, t)| t).max().unwrap_or(first_time);
    let span = max_time - min_time;

    committed
        .into_iter()
        .map(|(line_number, timestamp)| {
            let age_ratio = if span == 0 {
                0.0
            } else {
                (timestamp - min_time) as f64 / span as f64
            };
            HeatmapLineDatum {
                line_number,
                age_ratio,
                color: hsl_to_rgba(
                    hue_for_ratio(age_ratio, config),
                    config.saturation,
                    config.lightness,
                    config.opacity,
                ),
                timestamp,
            }
        })
        .collect()
}

/// Group heatmap data into `bucket_count` equal-width age-ratio buckets.
///
/// Bucket index is `floor(age_ratio * bucket_count)`, clamped to the last
/// bucket at ratio 1.0. Each bucket's shared color is computed at its
/// midpoint ratio. Empty buckets are omitted from the result.
pub fn bucketize(
    data: &[HeatmapLineDatum],
    bucket_count: usize,
    config: &ResolvedConfig,
) -> BTreeMap<usize, HeatmapBucket> {
    let count = bucket_count.max(1);
    let mut buckets: BTreeMap<usize, HeatmapBucket> = BTreeMap::new();

    for datum in data {
        let index = ((datum.age_ratio * count as f64) as usize).min(count - 1);
        let bucket = buckets.entry(index).or_insert_with(|| {
            let midpoint = (index as f64 + 0.5) / count as f64;
            HeatmapBucket {
                color: hsl_to_rgba(
                    hue_for_ratio(midpoint, config),
                    config.saturation,
                    config.lightness,
                    config.opacity,
                ),
                line_numbers: Vec::new(),
            }
        });
        bucket.line_numbers.push(datum.line_number);
    }

    for bucket in buckets.values_mut() {
        bucket.line_numbers.sort_unstable();
        bucket.line_numbers.dedup();
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::parse;

    fn config() -> ResolvedConfig {
        ResolvedConfig::defaults().expect("defaults should resolve")
    }

    fn report_with_times(times: &[(u32, i64)]) -> BlameReport {
        let mut raw = String::new();
        for &(line, time) in times {
            raw.push_str(&format!(
                "{} {} {}\nauthor A\nauthor-time {}\n\tx\n",
                "a".repeat(40),
                line,
                line,
                time
            ));
        }
        parse(&raw)
    }

    #[test]
    fn test_age_ratio_normalization() {
        let report = report_with_times(&[(1, 1000), (2, 2000), (3, 3000)]);
        let data = heatmap(&report, &config());
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].age_ratio, 0.0, "oldest line is ratio 0");
        assert_eq!(data[1].age_ratio, 0.5);
        assert_eq!(data[2].age_ratio, 1.0, "newest line is ratio 1");
    }

    #[test]
    fn test_uniform_timestamps_yield_zero_ratio() {
        let report = report_with_times(&[(1, 5000), (2, 5000), (3, 5000)]);
        let data = heatmap(&report, &config());
        assert!(
            data.iter().all(|d| d.age_ratio == 0.0),
            "same-age lines must not divide by zero"
        );
    }

    #[test]
    fn test_excludes_uncommitted_and_unknown_timestamps() {
        let raw = format!(
            "{a} 1 1\nauthor A\nauthor-time 1000\n\tx\n\
             {z} 2 2\nauthor Not Committed Yet\nauthor-time 2000\n\tx\n\
             {a} 3 3\nauthor A\n\tx\n",
            a = "a".repeat(40),
            z = "0".repeat(40),
        );
        let report = parse(&raw);
        let data = heatmap(&report, &config());
        assert_eq!(data.len(), 1, "uncommitted and unknown-time lines are excluded");
        assert_eq!(data[0].line_number, 1);
    }

    #[test]
    fn test_empty_when_no_committed_lines() {
        let raw = format!(
            "{z} 1 1\nauthor Not Committed Yet\nauthor-time 2000\n\tx\n",
            z = "0".repeat(40)
        );
        let report = parse(&raw);
        assert!(heatmap(&report, &config()).is_empty());
    }

    #[test]
    fn test_gradient_endpoints() {
        let cfg = config();
        let report = report_with_times(&[(1, 1000), (2, 2000)]);
        let data = heatmap(&report, &cfg);
        let cold = hsl_to_rgba(cfg.heatmap_cold_hue, cfg.saturation, cfg.lightness, cfg.opacity);
        let hot = hsl_to_rgba(cfg.heatmap_hot_hue, cfg.saturation, cfg.lightness, cfg.opacity);
        assert_eq!(data[0].color, cold, "ratio 0 renders the cold hue");
        assert_eq!(data[1].color, hot, "ratio 1 renders the hot hue");
    }

    #[test]
    fn test_bucket_index_never_reaches_bucket_count() {
        let times: Vec<(u32, i64)> = (1..=100).map(|i| (i, i as i64 * 37)).collect();
        let report = report_with_times(&times);
        let data = heatmap(&report, &config());
        for count in [1, 2, 7, 20] {
            let buckets = bucketize(&data, count, &config());
            assert!(
                buckets.keys().all(|&index| index < count),
                "bucket index must stay below {}",
                count
            );
        }
    }

    #[test]
    fn test_ratio_one_clamps_to_last_bucket() {
        let report = report_with_times(&[(1, 1000), (2, 2000)]);
        let data = heatmap(&report, &config());
        let buckets = bucketize(&data, 20, &config());
        assert!(buckets.contains_key(&19), "ratio 1.0 lands in the last bucket");
    }

    #[test]
    fn test_bucket_shares_midpoint_color() {
        let cfg = config();
        // Two lines in the same bucket share one color computed at the midpoint
        let report = report_with_times(&[(1, 1000), (2, 1001), (3, 2000)]);
        let data = heatmap(&report, &cfg);
        let buckets = bucketize(&data, 10, &cfg);
        let first = buckets.get(&0).expect("bucket 0 should exist");
        assert_eq!(first.line_numbers, vec![1, 2]);
        let midpoint_color = hsl_to_rgba(
            cfg.heatmap_cold_hue + (cfg.heatmap_hot_hue - cfg.heatmap_cold_hue) * 0.05,
            cfg.saturation,
            cfg.lightness,
            cfg.opacity,
        );
        assert_eq!(first.color, midpoint_color);
    }

    #[test]
    fn test_bucketize_empty_data() {
        assert!(bucketize(&[], 20, &config()).is_empty());
    }
}
