//! Support and resistance levels
//!
//! Local lows (highs) of the window are found with an inclusive 5-bar scan,
//! clustered greedily within a relative tolerance, and the cluster nearest to
//! the last close on the right side of it becomes the level.

use std::collections::HashMap;

use super::helpers::{
    cluster_levels, inclusive_extrema, nearest_above, nearest_below, to_fixed, Extremum,
    LEVEL_MIN_BARS, LEVEL_TOLERANCE,
};
use crate::{
    params::{get_ratio, ParamMeta, ParameterizedDetector},
    Direction, PatternDetector, PatternId, PatternKind, Ratio, Result, TradingPattern, OHLCV,
};

impl_with_defaults!(SupportLevelDetector, ResistanceLevelDetector);

/// Clustered levels from the inclusive local extrema of `values`
fn clustered_extrema(values: &[f64], kind: Extremum, tolerance: f64) -> Vec<f64> {
    let extrema: Vec<f64> = inclusive_extrema(values, kind)
        .into_iter()
        .map(|i| values[i])
        .collect();
    cluster_levels(&extrema, tolerance)
}

/// Nearest clustered support strictly below the last close.
///
/// `None` for windows shorter than ten candles or when no cluster sits below.
pub fn find_support_level<T: OHLCV>(candles: &[T], tolerance: f64) -> Option<f64> {
    if candles.len() < LEVEL_MIN_BARS {
        return None;
    }
    let price = candles.last()?.close();
    let lows: Vec<f64> = candles.iter().map(|c| c.low()).collect();
    nearest_below(&clustered_extrema(&lows, Extremum::Low, tolerance), price)
}

/// Nearest clustered resistance strictly above the last close.
pub fn find_resistance_level<T: OHLCV>(candles: &[T], tolerance: f64) -> Option<f64> {
    if candles.len() < LEVEL_MIN_BARS {
        return None;
    }
    let price = candles.last()?.close();
    let highs: Vec<f64> = candles.iter().map(|c| c.high()).collect();
    nearest_above(&clustered_extrema(&highs, Extremum::High, tolerance), price)
}

// ============================================================
// DETECTORS
// ============================================================

/// Support Level - price is holding above a clustered floor
#[derive(Debug, Clone, Copy)]
pub struct SupportLevelDetector {
    /// Relative distance for two lows to count as the same level
    pub tolerance: Ratio,
}

impl Default for SupportLevelDetector {
    fn default() -> Self {
        Self {
            tolerance: Ratio::new_const(LEVEL_TOLERANCE),
        }
    }
}

impl PatternDetector for SupportLevelDetector {
    fn id(&self) -> PatternId {
        PatternId("SUPPORT_LEVEL")
    }

    fn min_bars(&self) -> usize {
        LEVEL_MIN_BARS
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        // A zero level counts as no level.
        let level = find_support_level(window, self.tolerance.get()).filter(|&l| l != 0.0)?;
        let close = window.last()?.close();
        let distance = (close - level) / close * 100.0;

        Some(TradingPattern::new(
            "Support Level",
            PatternKind::Bullish,
            Direction::Bullish,
            format!(
                "Price {}% above support at {}",
                to_fixed(distance, 2),
                to_fixed(level, 5)
            ),
        ))
    }
}

/// Resistance Level - price is capped by a clustered ceiling
#[derive(Debug, Clone, Copy)]
pub struct ResistanceLevelDetector {
    /// Relative distance for two highs to count as the same level
    pub tolerance: Ratio,
}

impl Default for ResistanceLevelDetector {
    fn default() -> Self {
        Self {
            tolerance: Ratio::new_const(LEVEL_TOLERANCE),
        }
    }
}

impl PatternDetector for ResistanceLevelDetector {
    fn id(&self) -> PatternId {
        PatternId("RESISTANCE_LEVEL")
    }

    fn min_bars(&self) -> usize {
        LEVEL_MIN_BARS
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        let level = find_resistance_level(window, self.tolerance.get()).filter(|&l| l != 0.0)?;
        let close = window.last()?.close();
        let distance = (level - close) / close * 100.0;

        Some(TradingPattern::new(
            "Resistance Level",
            PatternKind::Bearish,
            Direction::Bearish,
            format!(
                "Price {}% below resistance at {}",
                to_fixed(distance, 2),
                to_fixed(level, 5)
            ),
        ))
    }
}

// ============================================================
// PARAMETERS
// ============================================================

static LEVEL_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "tolerance",
    LEVEL_TOLERANCE,
    (0.0001, 0.002, 0.0001),
    "Relative distance merging two extrema into one level",
)];

impl ParameterizedDetector for SupportLevelDetector {
    fn param_meta() -> &'static [ParamMeta] {
        LEVEL_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            tolerance: get_ratio(params, "tolerance", LEVEL_TOLERANCE)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "SUPPORT_LEVEL"
    }
}

impl ParameterizedDetector for ResistanceLevelDetector {
    fn param_meta() -> &'static [ParamMeta] {
        LEVEL_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            tolerance: get_ratio(params, "tolerance", LEVEL_TOLERANCE)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "RESISTANCE_LEVEL"
    }
}
