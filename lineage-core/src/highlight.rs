//! Mode-driven highlight classification
//!
//! Turns parsed blame data plus a selected mode into groups of line numbers
//! with associated colors, and a navigation sequence over all highlighted
//! lines. Exactly one mode is active per classification; each call replaces
//! the previous state wholesale.
//!
//! Global invariants enforced:
//! - Classification never fails for well-formed blame input; a missing mode
//!   parameter yields an empty result, not an error
//! - Group line sets and the navigation sequence are ascending and
//!   de-duplicated
//! - Group colors are derived from the group's identifier, so any
//!   collaborator can re-derive them without coordination

use crate::blame::BlameReport;
use crate::color::{color_for, hsl_to_rgba, Rgba};
use crate::config::ResolvedConfig;
use crate::heatmap;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier used to derive the color of the "recent" age group
const RECENT_KEY: &str = "recent";

/// Identifier used to derive the color of the branch-diff group
const DIFF_KEY: &str = "diff";

/// The active highlight mode with its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightMode {
    /// Idle: nothing is highlighted
    None,
    /// Committed lines at or after a cutoff (epoch milliseconds)
    Age { cutoff_ms: i64 },
    /// Every committed line, grouped by author name
    Author,
    /// Every committed line, grouped by commit id
    Commit,
    /// Age gradient over bounded buckets
    Heatmap,
    /// Lines by one author (case-insensitive exact match) or commit prefix
    SpecificAuthor { author: String },
    /// Lines of one commit (prefix match) or author (case-insensitive)
    SpecificCommit { commit: String },
    /// Externally supplied added-line set from a file-level diff
    BranchDiff { added_lines: Vec<u32> },
}

impl HighlightMode {
    /// Stable lowercase name of the mode, for reports and logs
    pub fn kind(&self) -> &'static str {
        match self {
            HighlightMode::None => "none",
            HighlightMode::Age { .. } => "age",
            HighlightMode::Author => "author",
            HighlightMode::Commit => "commit",
            HighlightMode::Heatmap => "heatmap",
            HighlightMode::SpecificAuthor { .. } => "specific_author",
            HighlightMode::SpecificCommit { .. } => "specific_commit",
            HighlightMode::BranchDiff { .. } => "branch_diff",
        }
    }
}

/// Classification key for one highlight group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    /// Committed lines at or after the age cutoff
    Recent,
    /// Working-tree lines not recorded in any revision
    Uncommitted,
    Author(String),
    Commit(String),
    /// Heatmap age bucket index
    Bucket(usize),
    /// Lines matching a specific-author/specific-commit target
    Match(String),
    /// Externally supplied branch-diff lines
    Diff,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Recent => write!(f, "recent"),
            GroupKey::Uncommitted => write!(f, "uncommitted"),
            GroupKey::Author(name) => write!(f, "author:{}", name),
            GroupKey::Commit(id) => write!(f, "commit:{}", id),
            GroupKey::Bucket(index) => write!(f, "bucket:{}", index),
            GroupKey::Match(target) => write!(f, "match:{}", target),
            GroupKey::Diff => write!(f, "diff"),
        }
    }
}

/// One highlight group: a color and the lines it covers
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightGroup {
    pub color: Rgba,
    /// Ascending, de-duplicated
    pub line_numbers: Vec<u32>,
}

/// Result of one classification call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    /// Group key -> color and lines; ordered for deterministic iteration
    pub groups: BTreeMap<GroupKey, HighlightGroup>,
    /// Ascending, de-duplicated union of all highlighted lines
    pub navigation: Vec<u32>,
}

impl Classification {
    pub fn empty() -> Self {
        Classification::default()
    }

    /// Next highlighted line strictly after `current_line`, wrapping to the
    /// first highlighted line; `None` when nothing is highlighted
    pub fn navigate_next(&self, current_line: u32) -> Option<u32> {
        self.navigation
            .iter()
            .find(|&&line| line > current_line)
            .or(self.navigation.first())
            .copied()
    }

    /// Previous highlighted line strictly before `current_line`, wrapping to
    /// the last highlighted line; `None` when nothing is highlighted
    pub fn navigate_previous(&self, current_line: u32) -> Option<u32> {
        self.navigation
            .iter()
            .rev()
            .find(|&&line| line < current_line)
            .or(self.navigation.last())
            .copied()
    }

    /// Normalize groups and derive the navigation sequence
    fn finish(mut groups: BTreeMap<GroupKey, HighlightGroup>) -> Self {
        groups.retain(|_, group| !group.line_numbers.is_empty());
        let mut navigation = Vec::new();
        for group in groups.values_mut() {
            group.line_numbers.sort_unstable();
            group.line_numbers.dedup();
            navigation.extend_from_slice(&group.line_numbers);
        }
        navigation.sort_unstable();
        navigation.dedup();
        Classification { groups, navigation }
    }
}

/// Color for the uncommitted (working tree) group
pub fn uncommitted_color(config: &ResolvedConfig) -> Rgba {
    hsl_to_rgba(
        config.uncommitted_hue,
        config.saturation,
        config.lightness,
        config.opacity,
    )
}

/// Color for a group derived from its identifier string
fn group_color(identifier: &str, config: &ResolvedConfig) -> Rgba {
    color_for(identifier, config.saturation, config.lightness, config.opacity)
}

/// Classify a parsed blame report under one highlight mode.
///
/// A failed report classifies as empty (no blame data available), as do mode
/// `None` and parameterized modes whose parameter is absent. Never errors.
pub fn classify(
    report: &BlameReport,
    mode: &HighlightMode,
    config: &ResolvedConfig,
) -> Classification {
    if !report.success {
        return Classification::empty();
    }

    match mode {
        HighlightMode::None => Classification::empty(),
        HighlightMode::Age { cutoff_ms } => classify_age(report, *cutoff_ms, config),
        HighlightMode::Author => classify_by(report, config, |record| {
            GroupKey::Author(record.author.clone())
        }),
        HighlightMode::Commit => classify_by(report, config, |record| {
            GroupKey::Commit(record.commit_id.clone())
        }),
        HighlightMode::Heatmap => classify_heatmap(report, config),
        HighlightMode::SpecificAuthor { author: target }
        | HighlightMode::SpecificCommit { commit: target } => {
            classify_target(report, target, config)
        }
        HighlightMode::BranchDiff { added_lines } => classify_diff(added_lines, config),
    }
}

/// Age mode: committed lines at or after the cutoff, uncommitted separate
fn classify_age(report: &BlameReport, cutoff_ms: i64, config: &ResolvedConfig) -> Classification {
    let cutoff_secs = cutoff_ms / 1000;
    let mut groups: BTreeMap<GroupKey, HighlightGroup> = BTreeMap::new();

    for record in report.lines.values() {
        if record.is_uncommitted {
            if config.highlight_uncommitted {
                push_line(
                    &mut groups,
                    GroupKey::Uncommitted,
                    uncommitted_color(config),
                    record.line_number,
                );
            }
            continue;
        }
        // Timestamp 0 means unknown, never "at epoch"
        if record.author_timestamp != 0 && record.author_timestamp >= cutoff_secs {
            push_line(
                &mut groups,
                GroupKey::Recent,
                group_color(RECENT_KEY, config),
                record.line_number,
            );
        }
    }

    Classification::finish(groups)
}

/// Author/commit modes: one group per identifier over committed lines
fn classify_by(
    report: &BlameReport,
    config: &ResolvedConfig,
    key_for: impl Fn(&crate::blame::BlameLineRecord) -> GroupKey,
) -> Classification {
    let mut groups: BTreeMap<GroupKey, HighlightGroup> = BTreeMap::new();

    for record in report.lines.values() {
        if record.is_uncommitted {
            if config.highlight_uncommitted {
                push_line(
                    &mut groups,
                    GroupKey::Uncommitted,
                    uncommitted_color(config),
                    record.line_number,
                );
            }
            continue;
        }
        let key = key_for(record);
        let color = group_color(&key.to_string(), config);
        push_line(&mut groups, key, color, record.line_number);
    }

    Classification::finish(groups)
}

/// Heatmap mode: bounded age buckets, uncommitted layered on top
fn classify_heatmap(report: &BlameReport, config: &ResolvedConfig) -> Classification {
    let data = heatmap::heatmap(report, config);
    let buckets = heatmap::bucketize(&data, config.heatmap_bucket_count, config);

    let mut groups: BTreeMap<GroupKey, HighlightGroup> = BTreeMap::new();
    for (index, bucket) in buckets {
        groups.insert(
            GroupKey::Bucket(index),
            HighlightGroup {
                color: bucket.color,
                line_numbers: bucket.line_numbers,
            },
        );
    }

    if config.highlight_uncommitted {
        for record in report.lines.values() {
            if record.is_uncommitted {
                push_line(
                    &mut groups,
                    GroupKey::Uncommitted,
                    uncommitted_color(config),
                    record.line_number,
                );
            }
        }
    }

    Classification::finish(groups)
}

/// Specific-author/specific-commit modes: one group of matching lines.
///
/// Committed and uncommitted lines alike are scanned. A line qualifies when
/// its author equals the target (case-insensitive exact match) or its commit
/// id starts with the target (prefix match, supporting abbreviated ids).
/// An absent target yields an empty classification.
fn classify_target(report: &BlameReport, target: &str, config: &ResolvedConfig) -> Classification {
    if target.is_empty() {
        return Classification::empty();
    }
    let target_lower = target.to_lowercase();
    let mut groups: BTreeMap<GroupKey, HighlightGroup> = BTreeMap::new();

    for record in report.lines.values() {
        let author_matches = record.author.to_lowercase() == target_lower;
        let commit_matches = record.commit_id.starts_with(target);
        if author_matches || commit_matches {
            push_line(
                &mut groups,
                GroupKey::Match(target.to_string()),
                group_color(target, config),
                record.line_number,
            );
        }
    }

    Classification::finish(groups)
}

/// Branch-diff mode: render an externally supplied line set as one group
fn classify_diff(added_lines: &[u32], config: &ResolvedConfig) -> Classification {
    if added_lines.is_empty() {
        return Classification::empty();
    }
    let mut groups = BTreeMap::new();
    groups.insert(
        GroupKey::Diff,
        HighlightGroup {
            color: group_color(DIFF_KEY, config),
            line_numbers: added_lines.to_vec(),
        },
    );
    Classification::finish(groups)
}

fn push_line(
    groups: &mut BTreeMap<GroupKey, HighlightGroup>,
    key: GroupKey,
    color: Rgba,
    line_number: u32,
) {
    groups
        .entry(key)
        .or_insert_with(|| HighlightGroup {
            color,
            line_numbers: Vec::new(),
        })
        .line_numbers
        .push(line_number);
}

#[cfg(test)]
#[path = "highlight/tests.rs"]
mod tests;
