//! Single-bar detectors: Doji, Hammer, Shooting Star
//!
//! All three look at the last candle of the window only and compare body and
//! shadow lengths against the candle's own high-low range.

use std::collections::HashMap;

use super::helpers::{range_ratio, DOJI_BODY_RATIO, LONG_SHADOW_RATIO, SMALL_BODY_RATIO};
use crate::{
    params::{get_ratio, ParamMeta, ParamType, ParameterizedDetector},
    Direction, OHLCVExt, PatternDetector, PatternId, PatternKind, Ratio, Result, TradingPattern,
    OHLCV,
};

impl_with_defaults!(DojiDetector, HammerDetector, ShootingStarDetector);

// ============================================================
// DOJI
// ============================================================

/// Doji - open and close nearly equal, market indecision
#[derive(Debug, Clone, Copy)]
pub struct DojiDetector {
    /// Body must be below this fraction of the range
    pub max_body_ratio: Ratio,
}

impl Default for DojiDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(DOJI_BODY_RATIO),
        }
    }
}

impl PatternDetector for DojiDetector {
    fn id(&self) -> PatternId {
        PatternId("DOJI")
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        let bar = window.last()?;
        let range = bar.range();

        // A bar without range has no proportions to judge.
        let is_doji = range > 0.0 && bar.body() / range < self.max_body_ratio.get();
        if !is_doji {
            return None;
        }

        Some(TradingPattern::new(
            "Doji",
            PatternKind::Reversal,
            Direction::Neutral,
            "Indecision in market",
        ))
    }
}

// ============================================================
// HAMMER FAMILY
// ============================================================

/// Hammer - small bullish body on top of a long lower shadow
#[derive(Debug, Clone, Copy)]
pub struct HammerDetector {
    pub max_body_ratio: Ratio,
    /// Lower shadow must exceed this fraction of the range
    pub min_shadow_ratio: Ratio,
}

impl Default for HammerDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(SMALL_BODY_RATIO),
            min_shadow_ratio: Ratio::new_const(LONG_SHADOW_RATIO),
        }
    }
}

impl PatternDetector for HammerDetector {
    fn id(&self) -> PatternId {
        PatternId("HAMMER")
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        let bar = window.last()?;
        let range = bar.range();
        let body = range_ratio(bar.body(), range)?;
        let lower = range_ratio(bar.lower_shadow(), range)?;

        if body < self.max_body_ratio.get()
            && lower > self.min_shadow_ratio.get()
            && bar.is_bullish()
        {
            return Some(TradingPattern::new(
                "Hammer",
                PatternKind::Reversal,
                Direction::Bullish,
                "Potential bullish reversal",
            ));
        }
        None
    }
}

/// Shooting Star - small bearish body under a long upper shadow
#[derive(Debug, Clone, Copy)]
pub struct ShootingStarDetector {
    pub max_body_ratio: Ratio,
    /// Upper shadow must exceed this fraction of the range
    pub min_shadow_ratio: Ratio,
}

impl Default for ShootingStarDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(SMALL_BODY_RATIO),
            min_shadow_ratio: Ratio::new_const(LONG_SHADOW_RATIO),
        }
    }
}

impl PatternDetector for ShootingStarDetector {
    fn id(&self) -> PatternId {
        PatternId("SHOOTING_STAR")
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        let bar = window.last()?;
        let range = bar.range();
        let body = range_ratio(bar.body(), range)?;
        let upper = range_ratio(bar.upper_shadow(), range)?;

        if body < self.max_body_ratio.get()
            && upper > self.min_shadow_ratio.get()
            && bar.is_bearish()
        {
            return Some(TradingPattern::new(
                "Shooting Star",
                PatternKind::Reversal,
                Direction::Bearish,
                "Potential bearish reversal",
            ));
        }
        None
    }
}

// ============================================================
// PARAMETERS
// ============================================================

static DOJI_PARAMS: &[ParamMeta] = &[ParamMeta {
    name: "max_body_ratio",
    param_type: ParamType::Ratio,
    default: DOJI_BODY_RATIO,
    range: (0.05, 0.2, 0.05),
    description: "Maximum body / range",
}];

static HAMMER_PARAMS: &[ParamMeta] = &[
    ParamMeta::ratio("max_body_ratio", SMALL_BODY_RATIO, (0.2, 0.4, 0.05), "Maximum body / range"),
    ParamMeta::ratio(
        "min_shadow_ratio",
        LONG_SHADOW_RATIO,
        (0.5, 0.8, 0.05),
        "Minimum dominant shadow / range",
    ),
];

impl ParameterizedDetector for DojiDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOJI_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_body_ratio: get_ratio(params, "max_body_ratio", DOJI_BODY_RATIO)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "DOJI"
    }
}

impl ParameterizedDetector for HammerDetector {
    fn param_meta() -> &'static [ParamMeta] {
        HAMMER_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_body_ratio: get_ratio(params, "max_body_ratio", SMALL_BODY_RATIO)?,
            min_shadow_ratio: get_ratio(params, "min_shadow_ratio", LONG_SHADOW_RATIO)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "HAMMER"
    }
}

impl ParameterizedDetector for ShootingStarDetector {
    fn param_meta() -> &'static [ParamMeta] {
        HAMMER_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_body_ratio: get_ratio(params, "max_body_ratio", SMALL_BODY_RATIO)?,
            min_shadow_ratio: get_ratio(params, "min_shadow_ratio", LONG_SHADOW_RATIO)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "SHOOTING_STAR"
    }
}
