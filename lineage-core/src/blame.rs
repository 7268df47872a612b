//! Blame report parsing
//!
//! Converts the verbose per-line blame output of a version-control tool into
//! structured per-line records. Each block is a header line
//! `<40-hex id> <orig-line> <final-line> [<count>]`, followed by metadata
//! lines, terminated by one tab-prefixed content line.
//!
//! Global invariants enforced:
//! - Parsing is lenient: malformed lines are skipped, never fatal
//! - Exactly one record per final line number (last block wins)
//! - The only failure path is an integer-conversion error during scanning,
//!   surfaced as `success: false`, never as a panic
//! - Identical input yields identical output

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All-zero revision id a blame report uses for working-tree lines
pub const UNCOMMITTED_SHA: &str = "0000000000000000000000000000000000000000";

/// Author name a blame report uses for working-tree lines
const UNCOMMITTED_AUTHOR: &str = "Not Committed Yet";

/// Case-insensitive substring that also marks a working-tree author
const UNCOMMITTED_MARKER: &str = "not committed";

/// Provenance of one line in the final file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BlameLineRecord {
    /// 1-indexed line number in the final file
    pub line_number: u32,
    /// Full revision id; `UNCOMMITTED_SHA` for working-tree lines
    pub commit_id: String,
    pub author: String,
    pub author_contact: String,
    /// Seconds since epoch; 0 means the metadata was absent, never "epoch"
    pub author_timestamp: i64,
    pub author_timezone: String,
    /// First line of the commit message; may be empty
    pub summary: String,
    pub is_uncommitted: bool,
    /// Filename at that revision (differs from the current name across renames)
    pub source_file_name: String,
}

/// Outcome of parsing one raw blame report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BlameReport {
    pub success: bool,
    /// Final line number -> record; ordered for deterministic iteration
    pub lines: BTreeMap<u32, BlameLineRecord>,
    pub line_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BlameReport {
    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize blame report to JSON")
    }
}

/// Block header: 40-hex revision id, original line, final line, optional count
fn header_regex() -> &'static Regex {
    static HEADER_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    HEADER_RE.get_or_init(|| Regex::new(r"^([0-9a-f]{40}) (\d+) (\d+)( \d+)?$").unwrap())
}

/// Parse a raw blame report into per-line records.
///
/// Lenient by design: blank lines are separators, lines that are neither a
/// valid header, a known metadata field, nor a content line are skipped.
/// Duplicate final line numbers keep the last block seen. An empty or
/// whitespace-only report parses successfully with zero lines.
///
/// The single failure path is an out-of-range integer in a header or
/// `author-time` field; it is caught here and reported as `success: false`
/// with an empty line map.
pub fn parse(raw_text: &str) -> BlameReport {
    match scan_blocks(raw_text) {
        Ok(lines) => BlameReport {
            success: true,
            line_count: lines.len(),
            lines,
            error: None,
        },
        Err(e) => BlameReport {
            success: false,
            lines: BTreeMap::new(),
            line_count: 0,
            error: Some(format!("{:#}", e)),
        },
    }
}

/// Scan all blocks in the report, indexing records by final line number
fn scan_blocks(raw_text: &str) -> Result<BTreeMap<u32, BlameLineRecord>> {
    let header = header_regex();
    let mut records = BTreeMap::new();
    let mut lines = raw_text.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(caps) = header.captures(line) else {
            // Not a header: stray metadata, content, or garbage. Skip.
            continue;
        };

        let commit_id = caps[1].to_string();
        let final_line: u32 = caps[3]
            .parse()
            .with_context(|| format!("final line number out of range: {}", &caps[3]))?;

        let record = scan_metadata(&mut lines, final_line, commit_id)?;
        // Last block wins for a duplicated final line number
        records.insert(final_line, record);
    }

    Ok(records)
}

/// Consume metadata lines for one block, up to and including the content line.
///
/// Stops without consuming if the next line is another block header, so a
/// block truncated before its content line does not swallow its successor.
fn scan_metadata(
    lines: &mut std::iter::Peekable<std::str::Lines<'_>>,
    line_number: u32,
    commit_id: String,
) -> Result<BlameLineRecord> {
    let header = header_regex();
    let mut author = String::new();
    let mut author_contact = String::new();
    let mut author_timestamp: i64 = 0;
    let mut author_timezone = String::new();
    let mut summary = String::new();
    let mut source_file_name = String::new();

    while let Some(&next) = lines.peek() {
        if next.starts_with('\t') {
            // Content line terminates the block
            lines.next();
            break;
        }
        if header.is_match(next) {
            // Truncated block: next block starts without a content line
            break;
        }
        let meta = lines.next().unwrap_or_default();

        if let Some(rest) = meta.strip_prefix("author ") {
            author = rest.to_string();
        } else if let Some(rest) = meta.strip_prefix("author-mail ") {
            author_contact = rest.to_string();
        } else if let Some(rest) = meta.strip_prefix("author-time ") {
            author_timestamp = rest
                .trim()
                .parse()
                .with_context(|| format!("author timestamp out of range: {}", rest))?;
        } else if let Some(rest) = meta.strip_prefix("author-tz ") {
            author_timezone = rest.to_string();
        } else if let Some(rest) = meta.strip_prefix("summary ") {
            // Verbatim, including the empty string
            summary = rest.to_string();
        } else if let Some(rest) = meta.strip_prefix("filename ") {
            source_file_name = rest.to_string();
        }
        // Everything else (committer*, previous, boundary, ...) is ignorable
    }

    let is_uncommitted = commit_id == UNCOMMITTED_SHA
        || author == UNCOMMITTED_AUTHOR
        || author.to_lowercase().contains(UNCOMMITTED_MARKER);

    Ok(BlameLineRecord {
        line_number,
        commit_id,
        author,
        author_contact,
        author_timestamp,
        author_timezone,
        summary,
        is_uncommitted,
        source_file_name,
    })
}
