//! Deterministic color derivation for blame identifiers
//!
//! Colors are derived from identifier strings (author names, commit ids) so
//! that any caller computes the same color for the same identifier without
//! coordination or registration.
//!
//! Global invariants enforced:
//! - Identical identifier and parameters yield identical colors across runs
//! - No global mutable state, clocks, or randomness

use serde::{Deserialize, Serialize};
use std::fmt;

/// Golden-angle constant (degrees) used to spread hashed hues across the wheel
const GOLDEN_ANGLE: f64 = 137.508;

/// Nonzero seed for the rolling string hash (djb2)
const HASH_SEED: i32 = 5381;

/// Saturation used when `distinct_colors_for` falls back to hashing
const FALLBACK_SATURATION: f64 = 65.0;

/// Lightness used when `distinct_colors_for` falls back to hashing
const FALLBACK_LIGHTNESS: f64 = 40.0;

/// Hand-tuned, maximally-separated colors for small identifier sets.
///
/// Assigned in first-seen order when a set has at most `DISTINCT_PALETTE.len()`
/// unique identifiers; beyond that, hash-derived colors are used instead.
const DISTINCT_PALETTE: &[(u8, u8, u8)] = &[
    (230, 25, 75),   // red
    (60, 180, 75),   // green
    (255, 225, 25),  // yellow
    (0, 130, 200),   // blue
    (245, 130, 48),  // orange
    (145, 30, 180),  // purple
    (70, 240, 240),  // cyan
    (240, 50, 230),  // magenta
    (210, 245, 60),  // lime
    (250, 190, 212), // pink
];

/// An RGB color with an alpha channel in `0..=1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    /// Opaque hex form, `#rrggbb` (alpha dropped)
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS functional form, `rgba(r, g, b, a)`
    pub fn to_css(self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css())
    }
}

/// Fold an identifier to a non-negative 32-bit hash.
///
/// Multiplicative rolling hash (djb2 variant): `h = h * 33 + byte`, seeded at
/// a fixed nonzero constant, wrapped to 32 bits, absolute value taken.
fn hash_identifier(identifier: &str) -> u32 {
    let mut hash: i32 = HASH_SEED;
    for byte in identifier.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as i32);
    }
    hash.unsigned_abs()
}

/// Hue in degrees for an identifier: hash spread by the golden angle
pub fn hue_for(identifier: &str) -> f64 {
    (hash_identifier(identifier) as f64 * GOLDEN_ANGLE) % 360.0
}

/// Derive a deterministic color for an identifier string.
///
/// `saturation` and `lightness` are percentages in `0..=100`; `opacity` is in
/// `0..=1`. Out-of-range parameters are clamped rather than rejected.
pub fn color_for(identifier: &str, saturation: f64, lightness: f64, opacity: f64) -> Rgba {
    hsl_to_rgba(hue_for(identifier), saturation, lightness, opacity)
}

/// Convert hue/saturation/lightness/opacity to RGBA.
///
/// Standard piecewise-linear HSL construction over six 60-degree hue sectors.
/// `hue` is taken modulo 360; the remaining parameters are clamped.
pub fn hsl_to_rgba(hue: f64, saturation: f64, lightness: f64, opacity: f64) -> Rgba {
    let h = hue.rem_euclid(360.0);
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);
    let a = opacity.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r1, g1, b1) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgba {
        r: ((r1 + m) * 255.0).round() as u8,
        g: ((g1 + m) * 255.0).round() as u8,
        b: ((b1 + m) * 255.0).round() as u8,
        a,
    }
}

/// Assign maximally-separated colors to a small identifier set.
///
/// Unique identifiers are collected in first-seen order. Sets of at most
/// `DISTINCT_PALETTE.len()` unique identifiers get hand-tuned palette colors;
/// larger sets fall back to `color_for` so collision risk degrades gracefully
/// instead of exhausting the palette.
pub fn distinct_colors_for(identifiers: &[&str], opacity: f64) -> Vec<(String, Rgba)> {
    let a = opacity.clamp(0.0, 1.0);

    let mut unique: Vec<&str> = Vec::new();
    for &id in identifiers {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }

    if unique.len() <= DISTINCT_PALETTE.len() {
        unique
            .iter()
            .zip(DISTINCT_PALETTE)
            .map(|(id, &(r, g, b))| (id.to_string(), Rgba { r, g, b, a }))
            .collect()
    } else {
        unique
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    color_for(id, FALLBACK_SATURATION, FALLBACK_LIGHTNESS, a),
                )
            })
            .collect()
    }
}
