//! Lineage CLI - blame analysis and highlight classification

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use lineage_core::config;
use lineage_core::heatmap;
use lineage_core::report::{
    render_blame_json, render_blame_text, render_classification_json, render_classification_text,
    render_heatmap_json, render_heatmap_text,
};
use lineage_core::{parse, BlameReport, HighlightMode, ResolvedConfig};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lineage")]
#[command(about = "Per-line provenance analysis from version-control blame reports")]
#[command(version = env!("LINEAGE_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a raw blame report and dump the structured records
    Parse {
        /// Path to the raw blame report, or `-` for stdin
        report: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Classify a blame report under a highlight mode
    Classify {
        /// Path to the raw blame report, or `-` for stdin
        report: PathBuf,

        /// Highlight mode
        #[arg(long)]
        mode: Mode,

        /// Age cutoff in epoch milliseconds (required for --mode age)
        #[arg(long)]
        cutoff_ms: Option<i64>,

        /// Target author (required for --mode specific-author)
        #[arg(long)]
        author: Option<String>,

        /// Target commit id, full or abbreviated (required for --mode specific-commit)
        #[arg(long)]
        commit: Option<String>,

        /// Comma-separated added line numbers (required for --mode branch-diff)
        #[arg(long)]
        diff_lines: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compute the age heatmap for a blame report
    Heatmap {
        /// Path to the raw blame report, or `-` for stdin
        report: PathBuf,

        /// Number of age buckets (overrides config file)
        #[arg(long)]
        buckets: Option<usize>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Find the next or previous highlighted line from a position
    Navigate {
        /// Path to the raw blame report, or `-` for stdin
        report: PathBuf,

        /// Highlight mode
        #[arg(long)]
        mode: Mode,

        /// Age cutoff in epoch milliseconds (required for --mode age)
        #[arg(long)]
        cutoff_ms: Option<i64>,

        /// Target author (required for --mode specific-author)
        #[arg(long)]
        author: Option<String>,

        /// Target commit id, full or abbreviated (required for --mode specific-commit)
        #[arg(long)]
        commit: Option<String>,

        /// Comma-separated added line numbers (required for --mode branch-diff)
        #[arg(long)]
        diff_lines: Option<String>,

        /// Current 1-indexed line position
        #[arg(long)]
        from: u32,

        /// Direction of travel
        #[arg(long)]
        direction: Direction,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running analysis
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, clap::ValueEnum)]
enum Mode {
    None,
    Age,
    Author,
    Commit,
    Heatmap,
    SpecificAuthor,
    SpecificCommit,
    BranchDiff,
}

#[derive(Clone, Copy, PartialEq, clap::ValueEnum)]
enum Direction {
    Next,
    Prev,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { report, format } => {
            let parsed = read_and_parse(&report)?;
            match format {
                OutputFormat::Text => print!("{}", render_blame_text(&parsed)),
                OutputFormat::Json => println!("{}", render_blame_json(&parsed)?),
            }
        }
        Commands::Classify {
            report,
            mode,
            cutoff_ms,
            author,
            commit,
            diff_lines,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let highlight_mode = build_mode(mode, cutoff_ms, author, commit, diff_lines)?;
            let parsed = read_and_parse(&report)?;
            warn_on_parse_failure(&parsed);

            let classification = lineage_core::classify(&parsed, &highlight_mode, &resolved);
            match format {
                OutputFormat::Text => print!(
                    "{}",
                    render_classification_text(&classification, highlight_mode.kind())
                ),
                OutputFormat::Json => println!(
                    "{}",
                    render_classification_json(&classification, highlight_mode.kind())?
                ),
            }
        }
        Commands::Heatmap {
            report,
            buckets,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let bucket_count = buckets.unwrap_or(resolved.heatmap_bucket_count);
            if bucket_count == 0 {
                anyhow::bail!("--buckets must be at least 1 (got 0)");
            }
            let parsed = read_and_parse(&report)?;
            warn_on_parse_failure(&parsed);

            let data = heatmap::heatmap(&parsed, &resolved);
            let bucket_map = heatmap::bucketize(&data, bucket_count, &resolved);
            match format {
                OutputFormat::Text => print!("{}", render_heatmap_text(&bucket_map)),
                OutputFormat::Json => println!("{}", render_heatmap_json(&bucket_map)?),
            }
        }
        Commands::Navigate {
            report,
            mode,
            cutoff_ms,
            author,
            commit,
            diff_lines,
            from,
            direction,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let highlight_mode = build_mode(mode, cutoff_ms, author, commit, diff_lines)?;
            let parsed = read_and_parse(&report)?;
            warn_on_parse_failure(&parsed);

            let classification = lineage_core::classify(&parsed, &highlight_mode, &resolved);
            let target = match direction {
                Direction::Next => classification.navigate_next(from),
                Direction::Prev => classification.navigate_previous(from),
            };
            match target {
                Some(line) => println!("{}", line),
                None => println!("none"),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(resolved) => {
                        if let Some(ref p) = resolved.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Read a raw blame report from a file or stdin (`-`)
fn read_report(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read blame report from stdin")?;
        Ok(raw)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read blame report: {}", path.display()))
    }
}

fn read_and_parse(path: &Path) -> anyhow::Result<BlameReport> {
    Ok(parse(&read_report(path)?))
}

fn warn_on_parse_failure(report: &BlameReport) {
    if !report.success {
        eprintln!(
            "Warning: blame report failed to parse: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
}

/// Load configuration for the current directory with optional explicit path
fn load_config(explicit: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&project_root, explicit)
        .context("failed to load configuration")?;
    if let Some(ref path) = resolved.config_path {
        eprintln!("Using config: {}", path.display());
    }
    Ok(resolved)
}

/// Build a highlight mode from CLI flags, rejecting missing parameters.
///
/// The core treats an absent parameter as an empty classification; the CLI
/// is the caller responsible for not invoking a parameterized mode bare.
fn build_mode(
    mode: Mode,
    cutoff_ms: Option<i64>,
    author: Option<String>,
    commit: Option<String>,
    diff_lines: Option<String>,
) -> anyhow::Result<HighlightMode> {
    match mode {
        Mode::None => Ok(HighlightMode::None),
        Mode::Age => {
            let cutoff_ms =
                cutoff_ms.ok_or_else(|| anyhow::anyhow!("--mode age requires --cutoff-ms"))?;
            Ok(HighlightMode::Age { cutoff_ms })
        }
        Mode::Author => Ok(HighlightMode::Author),
        Mode::Commit => Ok(HighlightMode::Commit),
        Mode::Heatmap => Ok(HighlightMode::Heatmap),
        Mode::SpecificAuthor => {
            let author = author
                .filter(|a| !a.is_empty())
                .ok_or_else(|| anyhow::anyhow!("--mode specific-author requires --author"))?;
            Ok(HighlightMode::SpecificAuthor { author })
        }
        Mode::SpecificCommit => {
            let commit = commit
                .filter(|c| !c.is_empty())
                .ok_or_else(|| anyhow::anyhow!("--mode specific-commit requires --commit"))?;
            Ok(HighlightMode::SpecificCommit { commit })
        }
        Mode::BranchDiff => {
            let raw = diff_lines
                .ok_or_else(|| anyhow::anyhow!("--mode branch-diff requires --diff-lines"))?;
            let added_lines = parse_diff_lines(&raw)?;
            Ok(HighlightMode::BranchDiff { added_lines })
        }
    }
}

/// Parse a comma-separated line-number list like `3,7,12`
fn parse_diff_lines(raw: &str) -> anyhow::Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .with_context(|| format!("invalid line number in --diff-lines: {}", part))
        })
        .collect()
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Colors:");
    println!("  saturation: {}", resolved.saturation);
    println!("  lightness: {}", resolved.lightness);
    println!("  opacity: {}", resolved.opacity);
    println!();
    println!("Heatmap:");
    println!("  cold_hue: {}", resolved.heatmap_cold_hue);
    println!("  hot_hue: {}", resolved.heatmap_hot_hue);
    println!("  bucket_count: {}", resolved.heatmap_bucket_count);
    println!();
    println!("Highlighting:");
    println!("  highlight_uncommitted: {}", resolved.highlight_uncommitted);
    println!("  uncommitted_hue: {}", resolved.uncommitted_hue);
    println!();
    println!("Cache:");
    println!("  capacity: {}", resolved.cache_capacity);
}
