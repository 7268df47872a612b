//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::blame::BlameReport;
use crate::heatmap::HeatmapBucket;
use crate::highlight::Classification;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// One highlight group in report form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupReport {
    pub key: String,
    pub color_hex: String,
    pub color_css: String,
    pub line_count: usize,
    pub line_numbers: Vec<u32>,
}

/// Classification in report form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassificationReport {
    pub mode: String,
    pub groups: Vec<GroupReport>,
    pub navigation: Vec<u32>,
}

impl ClassificationReport {
    /// Build a report from a classification.
    ///
    /// Group order follows the classification's ordered key set.
    pub fn new(classification: &Classification, mode_kind: &str) -> Self {
        let groups = classification
            .groups
            .iter()
            .map(|(key, group)| GroupReport {
                key: key.to_string(),
                color_hex: group.color.to_hex(),
                color_css: group.color.to_css(),
                line_count: group.line_numbers.len(),
                line_numbers: group.line_numbers.clone(),
            })
            .collect();

        ClassificationReport {
            mode: mode_kind.to_string(),
            groups,
            navigation: classification.navigation.clone(),
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize classification to JSON")
    }
}

/// Render a classification as text output
pub fn render_classification_text(classification: &Classification, mode_kind: &str) -> String {
    let report = ClassificationReport::new(classification, mode_kind);
    let mut output = String::new();

    output.push_str(&format!("Mode: {}\n", report.mode));
    output.push_str(&format!(
        "{:<40} {:<9} {:<6} {}\n",
        "GROUP", "COLOR", "LINES", "SPANS"
    ));

    for group in &report.groups {
        output.push_str(&format!(
            "{:<40} {:<9} {:<6} {}\n",
            truncate_or_pad(&group.key, 40),
            group.color_hex,
            group.line_count,
            format_line_spans(&group.line_numbers),
        ));
    }

    output.push_str(&format!(
        "Navigation: {}\n",
        format_line_spans(&report.navigation)
    ));
    output
}

/// Render a classification as JSON output
pub fn render_classification_json(
    classification: &Classification,
    mode_kind: &str,
) -> Result<String> {
    ClassificationReport::new(classification, mode_kind).to_json()
}

/// Render parsed blame records as text output
pub fn render_blame_text(report: &BlameReport) -> String {
    let mut output = String::new();

    if !report.success {
        output.push_str(&format!(
            "Parse failed: {}\n",
            report.error.as_deref().unwrap_or("unknown error")
        ));
        return output;
    }

    output.push_str(&format!(
        "{:<6} {:<10} {:<20} {:<12} {}\n",
        "LINE", "COMMIT", "AUTHOR", "TIME", "SUMMARY"
    ));
    for record in report.lines.values() {
        let commit_abbrev = if record.is_uncommitted {
            "(working)".to_string()
        } else {
            record.commit_id.chars().take(10).collect()
        };
        let time = if record.author_timestamp == 0 {
            "-".to_string()
        } else {
            record.author_timestamp.to_string()
        };
        output.push_str(&format!(
            "{:<6} {:<10} {:<20} {:<12} {}\n",
            record.line_number,
            commit_abbrev,
            truncate_or_pad(&record.author, 20),
            time,
            record.summary,
        ));
    }
    output
}

/// Render parsed blame records as JSON output
pub fn render_blame_json(report: &BlameReport) -> Result<String> {
    report.to_json()
}

/// One heatmap bucket in report form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HeatmapBucketReport {
    pub bucket: usize,
    pub color_hex: String,
    pub color_css: String,
    pub line_count: usize,
    pub line_numbers: Vec<u32>,
}

/// Flatten heatmap buckets into report rows, ordered by bucket index
fn heatmap_rows(buckets: &BTreeMap<usize, HeatmapBucket>) -> Vec<HeatmapBucketReport> {
    buckets
        .iter()
        .map(|(&index, bucket)| HeatmapBucketReport {
            bucket: index,
            color_hex: bucket.color.to_hex(),
            color_css: bucket.color.to_css(),
            line_count: bucket.line_numbers.len(),
            line_numbers: bucket.line_numbers.clone(),
        })
        .collect()
}

/// Render heatmap buckets as text output
pub fn render_heatmap_text(buckets: &BTreeMap<usize, HeatmapBucket>) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<8} {:<9} {:<6} {}\n",
        "BUCKET", "COLOR", "LINES", "SPANS"
    ));
    for row in heatmap_rows(buckets) {
        output.push_str(&format!(
            "{:<8} {:<9} {:<6} {}\n",
            row.bucket,
            row.color_hex,
            row.line_count,
            format_line_spans(&row.line_numbers),
        ));
    }
    output
}

/// Render heatmap buckets as JSON output
pub fn render_heatmap_json(buckets: &BTreeMap<usize, HeatmapBucket>) -> Result<String> {
    serde_json::to_string_pretty(&heatmap_rows(buckets))
        .context("failed to serialize heatmap to JSON")
}

/// Compress ascending line numbers into spans: `1-3, 7, 9-12`
pub fn format_line_spans(line_numbers: &[u32]) -> String {
    let mut spans: Vec<String> = Vec::new();
    let mut run: Option<(u32, u32)> = None;

    for &line in line_numbers {
        run = match run {
            Some((start, end)) if line == end + 1 => Some((start, line)),
            Some((start, end)) => {
                spans.push(span_text(start, end));
                Some((line, line))
            }
            None => Some((line, line)),
        };
    }
    if let Some((start, end)) = run {
        spans.push(span_text(start, end));
    }

    if spans.is_empty() {
        "-".to_string()
    } else {
        spans.join(", ")
    }
}

fn span_text(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.len() > width {
        format!("{}...", &s[..width.saturating_sub(3)])
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::parse;
    use crate::config::ResolvedConfig;
    use crate::highlight::{classify, HighlightMode};

    fn sample_classification() -> Classification {
        let raw = format!(
            "{a} 1 1\nauthor Alice\nauthor-time 1700000000\n\tx\n\
             {b} 2 2\nauthor Bob\nauthor-time 1500000000\n\tx\n",
            a = "a".repeat(40),
            b = "b".repeat(40),
        );
        let report = parse(&raw);
        let config = ResolvedConfig::defaults().expect("defaults should resolve");
        classify(&report, &HighlightMode::Author, &config)
    }

    #[test]
    fn test_format_line_spans() {
        assert_eq!(format_line_spans(&[]), "-");
        assert_eq!(format_line_spans(&[5]), "5");
        assert_eq!(format_line_spans(&[1, 2, 3]), "1-3");
        assert_eq!(format_line_spans(&[1, 2, 3, 7, 9, 10, 11, 12]), "1-3, 7, 9-12");
    }

    #[test]
    fn test_classification_text_is_deterministic() {
        let classification = sample_classification();
        let first = render_classification_text(&classification, "author");
        let second = render_classification_text(&classification, "author");
        assert_eq!(first, second);
        assert!(first.starts_with("Mode: author\n"));
        assert!(first.contains("author:Alice"));
        assert!(first.contains("author:Bob"));
    }

    #[test]
    fn test_classification_json_shape() {
        let classification = sample_classification();
        let json = render_classification_json(&classification, "author")
            .expect("serialization should succeed");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["mode"], "author");
        assert_eq!(value["groups"].as_array().map(|a| a.len()), Some(2));
        assert!(value["groups"][0]["color_hex"]
            .as_str()
            .is_some_and(|c| c.starts_with('#')));
    }

    #[test]
    fn test_blame_text_marks_working_tree_lines() {
        let raw = format!(
            "{z} 1 1\nauthor Not Committed Yet\n\tx\n",
            z = "0".repeat(40)
        );
        let report = parse(&raw);
        let text = render_blame_text(&report);
        assert!(text.contains("(working)"));
    }

    #[test]
    fn test_blame_text_reports_parse_failure() {
        let report = parse(&format!("{} 1 99999999999999999999\n\tx\n", "a".repeat(40)));
        let text = render_blame_text(&report);
        assert!(text.starts_with("Parse failed:"));
    }
}
