//! Moving-average crossover signal
//!
//! Two simple moving averages over closing prices, a fast one (6 bars) and a
//! slow one (14 bars), are compared on the latest bar and on the sequence with
//! the latest bar dropped. A side change between the two evaluations is a
//! fresh crossover (strength 80); otherwise the side alone gives the bias
//! (strength 60).

use std::fmt;

use tracing::{debug, warn};

use crate::{validate_candles, AnalysisError, Period, Result, OHLCV};

/// Strength reported for a crossover on the latest bar
pub const CROSSOVER_STRENGTH: u8 = 80;
/// Strength reported when the averages keep their previous order
pub const TREND_STRENGTH: u8 = 60;
/// Strength left in place when the averages are exactly equal
pub const NEUTRAL_STRENGTH: u8 = 50;

// ============================================================
// RESULT TYPES
// ============================================================

/// Directional trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Neutral => "NEUTRAL",
        })
    }
}

/// One supporting value shown next to the signal
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Indicator {
    pub name: String,
    pub value: f64,
    pub interpretation: String,
}

impl Indicator {
    fn new(name: impl Into<String>, value: f64, interpretation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            interpretation: interpretation.into(),
        }
    }
}

/// Output of [`SignalEngine::analyze`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisResult {
    pub signal: Signal,
    /// Confidence 0..=100
    pub strength: u8,
    pub indicators: Vec<Indicator>,
}

impl AnalysisResult {
    /// Result for a sequence too short to analyse
    pub fn insufficient() -> Self {
        Self {
            signal: Signal::Neutral,
            strength: 0,
            indicators: Vec::new(),
        }
    }

    /// Value of the named indicator, if present
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.value)
    }
}

// ============================================================
// CONFIG
// ============================================================

/// Signal engine configuration
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SignalConfig {
    pub fast: Period,
    pub slow: Period,
    /// Below this many candles the engine reports NEUTRAL with strength 0
    pub min_history: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            fast: Period::new_const(6),
            slow: Period::new_const(14),
            min_history: 15,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fast >= self.slow {
            return Err(AnalysisError::InvalidConfig(format!(
                "fast period {} must be shorter than slow period {}",
                self.fast, self.slow
            )));
        }
        // The previous-bar averages need a full slow window after dropping one candle.
        if self.min_history <= self.slow.get() {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_history {} must exceed slow period {}",
                self.min_history, self.slow
            )));
        }
        Ok(())
    }
}

// ============================================================
// ENGINE
// ============================================================

/// Dual SMA crossover signal engine
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    config: SignalConfig,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Compute the signal for the latest candle.
    ///
    /// Short sequences get [`AnalysisResult::insufficient`]. Input is not
    /// validated; see [`SignalEngine::analyze_checked`].
    pub fn analyze<T: OHLCV>(&self, candles: &[T]) -> AnalysisResult {
        let SignalConfig {
            fast,
            slow,
            min_history,
        } = self.config;

        if candles.len() < min_history {
            debug!(
                candles = candles.len(),
                required = min_history,
                "not enough candles for a signal"
            );
            return AnalysisResult::insufficient();
        }

        // "One bar ago" is the same average over the sequence minus its last candle.
        let prev = &candles[..candles.len() - 1];
        let (Some(ma_fast), Some(ma_slow), Some(prev_fast), Some(prev_slow)) = (
            sma(candles, fast),
            sma(candles, slow),
            sma(prev, fast),
            sma(prev, slow),
        ) else {
            return AnalysisResult::insufficient();
        };

        let (signal, strength) = if prev_fast < prev_slow && ma_fast > ma_slow {
            (Signal::Buy, CROSSOVER_STRENGTH)
        } else if prev_fast > prev_slow && ma_fast < ma_slow {
            (Signal::Sell, CROSSOVER_STRENGTH)
        } else if ma_fast > ma_slow {
            (Signal::Buy, TREND_STRENGTH)
        } else if ma_fast < ma_slow {
            (Signal::Sell, TREND_STRENGTH)
        } else {
            (Signal::Neutral, NEUTRAL_STRENGTH)
        };

        debug!(%signal, strength, ma_fast, ma_slow, "signal computed");

        let spread = ma_fast - ma_slow;
        AnalysisResult {
            signal,
            strength,
            indicators: vec![
                Indicator::new(format!("MA({fast})"), ma_fast, "Fast moving average"),
                Indicator::new(format!("MA({slow})"), ma_slow, "Slow moving average"),
                // An exact tie reads as bearish.
                Indicator::new(
                    "Crossover",
                    spread,
                    if spread > 0.0 { "Bullish" } else { "Bearish" },
                ),
            ],
        }
    }

    /// Validate the candles, then [`SignalEngine::analyze`]
    pub fn analyze_checked<T: OHLCV>(&self, candles: &[T]) -> Result<AnalysisResult> {
        if let Err(e) = validate_candles(candles) {
            warn!(error = %e, "rejecting candles before signal analysis");
            return Err(e);
        }
        Ok(self.analyze(candles))
    }
}

// ============================================================
// MOVING AVERAGES
// ============================================================

/// Simple moving average of the last `period` closes.
///
/// With fewer than `period` candles this degrades to the last close.
/// `None` only for an empty slice.
pub fn sma<T: OHLCV>(candles: &[T], period: Period) -> Option<f64> {
    let last = candles.last()?;
    let period = period.get();
    if candles.len() < period {
        return Some(last.close());
    }
    let sum: f64 = candles[candles.len() - period..]
        .iter()
        .map(|c| c.close())
        .sum();
    Some(sum / period as f64)
}

/// Exponential moving average of the closes.
///
/// Seeded with the SMA of the first `period` closes, then smoothed with
/// `k = 2 / (period + 1)` over the rest. Falls back to the last close when
/// fewer than `period` candles are given.
pub fn ema<T: OHLCV>(candles: &[T], period: Period) -> Option<f64> {
    let last = candles.last()?;
    let period = period.get();
    if candles.len() < period {
        return Some(last.close());
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = candles[..period].iter().map(|c| c.close()).sum::<f64>() / period as f64;
    Some(
        candles[period..]
            .iter()
            .fold(seed, |ema, c| c.close() * k + ema * (1.0 - k)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Close(f64);

    impl OHLCV for Close {
        fn open(&self) -> f64 {
            self.0
        }

        fn high(&self) -> f64 {
            self.0
        }

        fn low(&self) -> f64 {
            self.0
        }

        fn close(&self) -> f64 {
            self.0
        }

        fn volume(&self) -> f64 {
            0.0
        }
    }

    fn closes(values: &[f64]) -> Vec<Close> {
        values.iter().copied().map(Close).collect()
    }

    fn p(n: usize) -> Period {
        Period::new(n).unwrap()
    }

    #[test]
    fn test_sma_mean_of_tail() {
        let data = closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(sma(&data, p(3)), Some(5.0));
        assert_eq!(sma(&data, p(6)), Some(3.5));
    }

    #[test]
    fn test_sma_short_input_is_last_close() {
        let data = closes(&[1.0, 2.0, 7.5]);
        assert_eq!(sma(&data, p(14)), Some(7.5));
        assert_eq!(sma::<Close>(&[], p(3)), None);
    }

    #[test]
    fn test_ema_seed_and_smoothing() {
        // period 3: seed = 2.0, k = 0.5 -> 0.5*4 + 0.5*2 = 3.0, then 0.5*6 + 0.5*3 = 4.5
        let data = closes(&[1.0, 2.0, 3.0, 4.0, 6.0]);
        let v = ema(&data, p(3)).unwrap();
        assert!((v - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_ema_short_input_is_last_close() {
        assert_eq!(ema(&closes(&[3.0, 4.0]), p(5)), Some(4.0));
        assert_eq!(ema::<Close>(&[], p(5)), None);
    }

    #[test]
    fn test_config_validation() {
        assert!(SignalConfig::default().validate().is_ok());

        let inverted = SignalConfig {
            fast: p(14),
            slow: p(6),
            min_history: 15,
        };
        assert!(SignalEngine::new(inverted).is_err());

        let too_short = SignalConfig {
            min_history: 14,
            ..SignalConfig::default()
        };
        assert!(matches!(
            SignalEngine::new(too_short),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_insufficient_history() {
        let engine = SignalEngine::default();
        let result = engine.analyze(&closes(&[1.0; 14]));
        assert_eq!(result, AnalysisResult::insufficient());
    }

    #[test]
    fn test_flat_prices_neutral_fallthrough() {
        // 100.0 sums exactly over both windows, so the averages tie.
        let result = SignalEngine::default().analyze(&closes(&[100.0; 20]));
        assert_eq!(result.signal, Signal::Neutral);
        assert_eq!(result.strength, NEUTRAL_STRENGTH);
        assert_eq!(result.indicators.len(), 3);
        assert_eq!(result.indicators[2].value, 0.0);
        assert_eq!(result.indicators[2].interpretation, "Bearish");
    }

    #[test]
    fn test_flat_prices_with_rounding_error() {
        // 1.05 does not sum exactly: the 14-bar mean lands a hair above the 6-bar mean.
        let result = SignalEngine::default().analyze(&closes(&[1.05; 20]));
        let fast = result.indicator("MA(6)").unwrap();
        let slow = result.indicator("MA(14)").unwrap();
        let expected = if fast > slow {
            Signal::Buy
        } else if fast < slow {
            Signal::Sell
        } else {
            Signal::Neutral
        };
        assert_eq!(result.signal, expected);
        assert!((fast - slow).abs() < 1e-12);
    }

    #[test]
    fn test_indicator_names_follow_periods() {
        let config = SignalConfig {
            fast: p(3),
            slow: p(5),
            min_history: 6,
        };
        let engine = SignalEngine::new(config).unwrap();
        let data: Vec<_> = (0..8).map(|i| Close(i as f64)).collect();
        let result = engine.analyze(&data);
        let names: Vec<_> = result.indicators.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["MA(3)", "MA(5)", "Crossover"]);
        assert_eq!(result.indicator("MA(3)"), Some(6.0));
        assert_eq!(result.indicator("MA(5)"), Some(5.0));
    }

    #[test]
    fn test_signal_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Signal::Neutral).unwrap(), "\"NEUTRAL\"");
    }
}
