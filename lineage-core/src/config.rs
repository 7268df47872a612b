//! Configuration file support for Lineage
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.lineagerc.json` in project root
//! 3. `lineage.config.json` in project root
//!
//! All fields are optional. CLI flags take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default saturation percentage for derived colors
const DEFAULT_SATURATION: f64 = 65.0;

/// Default lightness percentage for derived colors
const DEFAULT_LIGHTNESS: f64 = 40.0;

/// Default opacity for highlight colors
const DEFAULT_OPACITY: f64 = 0.6;

/// Default heatmap hue for the oldest lines (blue)
const DEFAULT_COLD_HUE: f64 = 240.0;

/// Default heatmap hue for the newest lines (teal)
const DEFAULT_HOT_HUE: f64 = 160.0;

/// Default number of heatmap age buckets
const DEFAULT_BUCKET_COUNT: usize = 20;

/// Default hue for the uncommitted (working tree) group (orange)
const DEFAULT_UNCOMMITTED_HUE: f64 = 20.0;

/// Lineage configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineageConfig {
    /// Saturation percentage (0-100) for derived colors
    #[serde(default)]
    pub saturation: Option<f64>,

    /// Lightness percentage (0-100) for derived colors
    #[serde(default)]
    pub lightness: Option<f64>,

    /// Opacity (0-1) for highlight colors
    #[serde(default)]
    pub opacity: Option<f64>,

    /// Heatmap gradient endpoints and bucketing
    #[serde(default)]
    pub heatmap: Option<HeatmapConfig>,

    /// Highlight uncommitted (working tree) lines as their own group
    #[serde(default)]
    pub highlight_uncommitted: Option<bool>,

    /// Hue (degrees) for the uncommitted group
    #[serde(default)]
    pub uncommitted_hue: Option<f64>,

    /// Maximum number of (file, revision) blame results kept in the cache
    #[serde(default)]
    pub cache_capacity: Option<usize>,
}

/// Heatmap gradient configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatmapConfig {
    /// Hue (degrees) for the oldest committed lines (default: 240, blue)
    pub cold_hue: Option<f64>,
    /// Hue (degrees) for the newest committed lines (default: 160, teal)
    pub hot_hue: Option<f64>,
    /// Number of equal-width age buckets (default: 20)
    pub bucket_count: Option<usize>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub saturation: f64,
    pub lightness: f64,
    pub opacity: f64,
    pub heatmap_cold_hue: f64,
    pub heatmap_hot_hue: f64,
    pub heatmap_bucket_count: usize,
    pub highlight_uncommitted: bool,
    pub uncommitted_hue: f64,
    pub cache_capacity: usize,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl LineageConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("saturation", self.saturation), ("lightness", self.lightness)] {
            if let Some(v) = value {
                if !(0.0..=100.0).contains(&v) {
                    anyhow::bail!("{} must be between 0 and 100 (got {})", name, v);
                }
            }
        }

        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                anyhow::bail!("opacity must be between 0 and 1 (got {})", opacity);
            }
        }

        let hues = [
            ("heatmap.cold_hue", self.heatmap.as_ref().and_then(|h| h.cold_hue)),
            ("heatmap.hot_hue", self.heatmap.as_ref().and_then(|h| h.hot_hue)),
            ("uncommitted_hue", self.uncommitted_hue),
        ];
        for (name, value) in hues {
            if let Some(v) = value {
                if !(0.0..=360.0).contains(&v) {
                    anyhow::bail!("{} must be between 0 and 360 (got {})", name, v);
                }
            }
        }

        if let Some(count) = self.heatmap.as_ref().and_then(|h| h.bucket_count) {
            if count == 0 {
                anyhow::bail!("heatmap.bucket_count must be at least 1 (got 0)");
            }
        }

        if let Some(capacity) = self.cache_capacity {
            if capacity == 0 {
                anyhow::bail!("cache_capacity must be at least 1 (got 0)");
            }
        }

        Ok(())
    }

    /// Resolve config into a fully-defaulted form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let (cold_hue, hot_hue, bucket_count) = match &self.heatmap {
            Some(h) => (
                h.cold_hue.unwrap_or(DEFAULT_COLD_HUE),
                h.hot_hue.unwrap_or(DEFAULT_HOT_HUE),
                h.bucket_count.unwrap_or(DEFAULT_BUCKET_COUNT),
            ),
            None => (DEFAULT_COLD_HUE, DEFAULT_HOT_HUE, DEFAULT_BUCKET_COUNT),
        };

        Ok(ResolvedConfig {
            saturation: self.saturation.unwrap_or(DEFAULT_SATURATION),
            lightness: self.lightness.unwrap_or(DEFAULT_LIGHTNESS),
            opacity: self.opacity.unwrap_or(DEFAULT_OPACITY),
            heatmap_cold_hue: cold_hue,
            heatmap_hot_hue: hot_hue,
            heatmap_bucket_count: bucket_count,
            highlight_uncommitted: self.highlight_uncommitted.unwrap_or(true),
            uncommitted_hue: self.uncommitted_hue.unwrap_or(DEFAULT_UNCOMMITTED_HUE),
            cache_capacity: self.cache_capacity.unwrap_or(crate::cache::DEFAULT_CACHE_CAPACITY),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        LineageConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.lineagerc.json`
/// 2. `lineage.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(LineageConfig, PathBuf)>> {
    let rc_path = project_root.join(".lineagerc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    let config_path = project_root.join("lineage.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    Ok(None)
}

/// Load and parse a config file
fn load_config_file(path: &Path) -> Result<LineageConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Load, validate, and resolve configuration.
///
/// An explicit path takes precedence over discovery; with neither present,
/// defaults are used.
pub fn load_and_resolve(project_root: &Path, explicit_path: Option<&Path>) -> Result<ResolvedConfig> {
    let loaded = match explicit_path {
        Some(path) => {
            let config = load_config_file(path)?;
            Some((config, path.to_path_buf()))
        }
        None => discover_config(project_root)?,
    };

    match loaded {
        Some((config, path)) => {
            let mut resolved = config
                .resolve()
                .with_context(|| format!("invalid config: {}", path.display()))?;
            resolved.config_path = Some(path);
            Ok(resolved)
        }
        None => ResolvedConfig::defaults(),
    }
}
