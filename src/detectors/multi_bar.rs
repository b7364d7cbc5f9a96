//! Multi-bar detectors: Double Top, Double Bottom
//!
//! Only the last `lookback` candles are examined. Peaks (troughs) must beat
//! both neighbours on each side strictly, unlike the level scan where ties
//! count.

use std::collections::HashMap;

use super::helpers::{
    matched_extrema, Extremum, DOUBLE_LOOKBACK, DOUBLE_MAX_DIFF, DOUBLE_MIN_SEPARATION,
};
use crate::{
    params::{get_period, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
    AnalysisError, Direction, PatternDetector, PatternId, PatternKind, Period, Ratio, Result,
    TradingPattern, OHLCV,
};

impl_with_defaults!(DoubleTopDetector, DoubleBottomDetector);

/// Shared settings of the double top / bottom pair
fn validate_double(lookback: Period, min_separation: Period) -> Result<()> {
    // Five bars are needed to find a single extremum.
    if lookback.get() < 5 {
        return Err(AnalysisError::OutOfRange {
            field: "lookback",
            value: lookback.get() as f64,
            min: 5.0,
            max: f64::INFINITY,
        });
    }
    if min_separation >= lookback {
        return Err(AnalysisError::InvalidConfig(format!(
            "min_separation {min_separation} must be below lookback {lookback}"
        )));
    }
    Ok(())
}

/// Trailing `lookback` values picked by `f`, or `None` when the window is shorter
fn tail_values<T: OHLCV>(
    window: &[T],
    lookback: Period,
    f: impl Fn(&T) -> f64,
) -> Option<Vec<f64>> {
    let n = lookback.get();
    if window.len() < n {
        return None;
    }
    Some(window[window.len() - n..].iter().map(f).collect())
}

// ============================================================
// DOUBLE TOP
// ============================================================

/// Double Top - two peaks of similar height, bearish reversal
#[derive(Debug, Clone, Copy)]
pub struct DoubleTopDetector {
    pub lookback: Period,
    /// Minimum bars between the two peaks
    pub min_separation: Period,
    /// Maximum height difference relative to the higher peak
    pub max_diff: Ratio,
}

impl Default for DoubleTopDetector {
    fn default() -> Self {
        Self {
            lookback: Period::new_const(DOUBLE_LOOKBACK),
            min_separation: Period::new_const(DOUBLE_MIN_SEPARATION),
            max_diff: Ratio::new_const(DOUBLE_MAX_DIFF),
        }
    }
}

impl PatternDetector for DoubleTopDetector {
    fn id(&self) -> PatternId {
        PatternId("DOUBLE_TOP")
    }

    fn min_bars(&self) -> usize {
        self.lookback.get()
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        let highs = tail_values(window, self.lookback, |c| c.high())?;
        if !matched_extrema(
            &highs,
            Extremum::High,
            self.min_separation.get(),
            self.max_diff.get(),
        ) {
            return None;
        }

        Some(TradingPattern::new(
            "Double Top",
            PatternKind::Reversal,
            Direction::Bearish,
            "Bearish reversal pattern",
        ))
    }

    fn validate_config(&self) -> Result<()> {
        validate_double(self.lookback, self.min_separation)
    }
}

// ============================================================
// DOUBLE BOTTOM
// ============================================================

/// Double Bottom - two troughs of similar depth, bullish reversal
#[derive(Debug, Clone, Copy)]
pub struct DoubleBottomDetector {
    pub lookback: Period,
    pub min_separation: Period,
    /// Maximum depth difference relative to the lower trough
    pub max_diff: Ratio,
}

impl Default for DoubleBottomDetector {
    fn default() -> Self {
        Self {
            lookback: Period::new_const(DOUBLE_LOOKBACK),
            min_separation: Period::new_const(DOUBLE_MIN_SEPARATION),
            max_diff: Ratio::new_const(DOUBLE_MAX_DIFF),
        }
    }
}

impl PatternDetector for DoubleBottomDetector {
    fn id(&self) -> PatternId {
        PatternId("DOUBLE_BOTTOM")
    }

    fn min_bars(&self) -> usize {
        self.lookback.get()
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        let lows = tail_values(window, self.lookback, |c| c.low())?;
        if !matched_extrema(
            &lows,
            Extremum::Low,
            self.min_separation.get(),
            self.max_diff.get(),
        ) {
            return None;
        }

        Some(TradingPattern::new(
            "Double Bottom",
            PatternKind::Reversal,
            Direction::Bullish,
            "Bullish reversal pattern",
        ))
    }

    fn validate_config(&self) -> Result<()> {
        validate_double(self.lookback, self.min_separation)
    }
}

// ============================================================
// PARAMETERS
// ============================================================

static DOUBLE_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("lookback", DOUBLE_LOOKBACK as f64, (10.0, 30.0, 5.0), "Bars examined"),
    ParamMeta::period(
        "min_separation",
        DOUBLE_MIN_SEPARATION as f64,
        (2.0, 6.0, 1.0),
        "Minimum bars between extrema",
    ),
    ParamMeta {
        name: "max_diff",
        param_type: ParamType::Ratio,
        default: DOUBLE_MAX_DIFF,
        range: (0.005, 0.03, 0.005),
        description: "Maximum relative difference between extrema",
    },
];

impl ParameterizedDetector for DoubleTopDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOUBLE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self {
            lookback: get_period(params, "lookback", DOUBLE_LOOKBACK)?,
            min_separation: get_period(params, "min_separation", DOUBLE_MIN_SEPARATION)?,
            max_diff: get_ratio(params, "max_diff", DOUBLE_MAX_DIFF)?,
        };
        PatternDetector::validate_config(&d)?;
        Ok(d)
    }

    fn pattern_id_str() -> &'static str {
        "DOUBLE_TOP"
    }
}

impl ParameterizedDetector for DoubleBottomDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOUBLE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self {
            lookback: get_period(params, "lookback", DOUBLE_LOOKBACK)?,
            min_separation: get_period(params, "min_separation", DOUBLE_MIN_SEPARATION)?,
            max_diff: get_ratio(params, "max_diff", DOUBLE_MAX_DIFF)?,
        };
        PatternDetector::validate_config(&d)?;
        Ok(d)
    }

    fn pattern_id_str() -> &'static str {
        "DOUBLE_BOTTOM"
    }
}
