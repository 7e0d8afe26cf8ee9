//! Network configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Iso line count per parameter direction for surface evaluation.
pub const DEFAULT_ISO_LINES: usize = 50;

/// Sample count along each arc for curve evaluation.
pub const DEFAULT_CURVE_DIV_POINTS: usize = 100;

/// Highest derivative order evaluated on arcs.
pub const DEFAULT_CURVE_DERIVATIVE_ORDER: usize = 2;

/// Patches around a regular interior vertex.
pub const DEFAULT_VERTEX_VALENCE: usize = 4;

/// Distance under which two control points count as coincident.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Settings shared by surface and curve networks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeConfig {
    pub iso_line_count_u: usize,
    pub iso_line_count_v: usize,
    pub curve_division_points: usize,
    pub curve_derivative_order: usize,
    /// A vertex walk giving up after twice this many hops reports a malformed graph.
    pub expected_valence: usize,
    pub continuity_tolerance: f64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            iso_line_count_u: DEFAULT_ISO_LINES,
            iso_line_count_v: DEFAULT_ISO_LINES,
            curve_division_points: DEFAULT_CURVE_DIV_POINTS,
            curve_derivative_order: DEFAULT_CURVE_DERIVATIVE_ORDER,
            expected_valence: DEFAULT_VERTEX_VALENCE,
            continuity_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl CompositeConfig {
    /// Create config from environment variables with defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            iso_line_count_u: env_or("MOSAIC_ISO_LINES_U", defaults.iso_line_count_u),
            iso_line_count_v: env_or("MOSAIC_ISO_LINES_V", defaults.iso_line_count_v),
            curve_division_points: env_or(
                "MOSAIC_CURVE_DIV_POINTS",
                defaults.curve_division_points,
            ),
            curve_derivative_order: env_or(
                "MOSAIC_CURVE_DERIVATIVE_ORDER",
                defaults.curve_derivative_order,
            ),
            expected_valence: env_or("MOSAIC_VERTEX_VALENCE", defaults.expected_valence),
            continuity_tolerance: env_or("MOSAIC_TOLERANCE", defaults.continuity_tolerance),
        }
    }

    /// Hop limit for one sense of a vertex walk.
    pub fn max_vertex_hops(&self) -> usize {
        2 * self.expected_valence.max(1)
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, fallback = %default, "ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}
