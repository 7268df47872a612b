//! Lineage core library - blame report parsing and highlight classification

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Classification is strictly per-line
// - No global mutable state
// - No randomness, clocks, threads, or async
// - Deterministic iteration order must be explicit
// - Identical input yields byte-for-byte identical output

pub mod blame;
pub mod cache;
pub mod color;
pub mod config;
pub mod engine;
pub mod heatmap;
pub mod highlight;
pub mod report;

pub use blame::{parse, BlameLineRecord, BlameReport, UNCOMMITTED_SHA};
pub use cache::{BlameCache, CacheStats};
pub use color::{color_for, distinct_colors_for, Rgba};
pub use config::{LineageConfig, ResolvedConfig};
pub use engine::BlameEngine;
pub use highlight::{classify, Classification, GroupKey, HighlightMode};
pub use report::{render_classification_json, render_classification_text};

/// Parse a raw blame report and classify it in one call (no caching).
///
/// Convenience for one-shot callers; sessions that revisit files should use
/// [`BlameEngine`] so repeated requests hit the cache.
pub fn classify_report(
    raw_text: &str,
    mode: &HighlightMode,
    config: &ResolvedConfig,
) -> Classification {
    let report = blame::parse(raw_text);
    highlight::classify(&report, mode, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_report_one_shot() {
        let raw = format!(
            "{} 1 1\nauthor Alice\nauthor-time 1700000000\n\tx\n",
            "a".repeat(40)
        );
        let config = ResolvedConfig::defaults().expect("defaults should resolve");
        let classification = classify_report(&raw, &HighlightMode::Author, &config);
        assert_eq!(classification.navigation, vec![1]);
    }
}
