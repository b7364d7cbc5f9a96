//! Two-bar detectors: Bullish and Bearish Engulfing
//!
//! The last candle's body must fully contain the previous candle's body, with
//! the two candles of opposite colour. Both ends must engulf strictly.

use crate::{Direction, OHLCVExt, PatternDetector, PatternId, PatternKind, TradingPattern, OHLCV};

impl_with_defaults!(BullishEngulfingDetector, BearishEngulfingDetector);

/// Previous and last candle of the window
#[inline]
fn last_pair<T: OHLCV>(window: &[T]) -> Option<(&T, &T)> {
    match window {
        [.., prev, curr] => Some((prev, curr)),
        _ => None,
    }
}

// ============================================================
// ENGULFING PATTERNS
// ============================================================

/// Bullish Engulfing - bullish candle swallowing a bearish one
#[derive(Debug, Clone, Copy, Default)]
pub struct BullishEngulfingDetector;

impl PatternDetector for BullishEngulfingDetector {
    fn id(&self) -> PatternId {
        PatternId("BULLISH_ENGULFING")
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        let (prev, curr) = last_pair(window)?;

        let engulfs = prev.is_bearish()
            && curr.is_bullish()
            && curr.open() < prev.close()
            && curr.close() > prev.open();
        if !engulfs {
            return None;
        }

        Some(TradingPattern::new(
            "Bullish Engulfing",
            PatternKind::Bullish,
            Direction::Bullish,
            "Strong buying pressure",
        ))
    }
}

/// Bearish Engulfing - bearish candle swallowing a bullish one
#[derive(Debug, Clone, Copy, Default)]
pub struct BearishEngulfingDetector;

impl PatternDetector for BearishEngulfingDetector {
    fn id(&self) -> PatternId {
        PatternId("BEARISH_ENGULFING")
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
        let (prev, curr) = last_pair(window)?;

        let engulfs = prev.is_bullish()
            && curr.is_bearish()
            && curr.open() > prev.close()
            && curr.close() < prev.open();
        if !engulfs {
            return None;
        }

        Some(TradingPattern::new(
            "Bearish Engulfing",
            PatternKind::Bearish,
            Direction::Bearish,
            "Strong selling pressure",
        ))
    }
}
