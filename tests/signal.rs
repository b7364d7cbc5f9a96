//! Integration tests for the moving-average crossover signal.

use candlecast::prelude::*;
use chrono::{Duration, TimeZone, Utc};

/// Candles with the given closes, one every 5 minutes
fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            Candle::new(
                start + Duration::minutes(5 * i as i64),
                c,
                c + 0.5,
                c - 0.5,
                c,
                1_000,
            )
        })
        .collect()
}

/// Slow decline then a jump on the last bar
fn fresh_bullish_cross() -> Vec<Candle> {
    let mut closes: Vec<f64> = (0..19).map(|i| 100.0 - 0.1 * i as f64).collect();
    closes.push(110.0);
    candles_from_closes(&closes)
}

/// Slow rise then a drop on the last bar
fn fresh_bearish_cross() -> Vec<Candle> {
    let mut closes: Vec<f64> = (0..19).map(|i| 100.0 + 0.1 * i as f64).collect();
    closes.push(90.0);
    candles_from_closes(&closes)
}

// ============================================================
// CROSSOVERS
// ============================================================

#[test]
fn test_fresh_bullish_crossover() {
    let result = candlecast::analyze(&fresh_bullish_cross());
    assert_eq!(result.signal, Signal::Buy);
    assert_eq!(result.strength, 80);

    // fast: (98.6 + 98.5 + 98.4 + 98.3 + 98.2 + 110) / 6
    let fast = result.indicator("MA(6)").unwrap();
    assert!((fast - 602.0 / 6.0).abs() < 1e-9);
    // slow: (13 closes averaging 98.8, plus 110) / 14
    let slow = result.indicator("MA(14)").unwrap();
    assert!((slow - 1394.4 / 14.0).abs() < 1e-9);

    let crossover = &result.indicators[2];
    assert_eq!(crossover.name, "Crossover");
    assert!((crossover.value - (fast - slow)).abs() < 1e-12);
    assert_eq!(crossover.interpretation, "Bullish");
}

#[test]
fn test_fresh_bearish_crossover() {
    let result = candlecast::analyze(&fresh_bearish_cross());
    assert_eq!(result.signal, Signal::Sell);
    assert_eq!(result.strength, 80);
    assert_eq!(result.indicators[2].interpretation, "Bearish");
    assert!(result.indicators[2].value < 0.0);
}

#[test]
fn test_sustained_uptrend() {
    let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    let result = candlecast::analyze(&candles_from_closes(&closes));
    assert_eq!(result.signal, Signal::Buy);
    assert_eq!(result.strength, 60);
    // last 6 closes 114..=119, last 14 closes 106..=119
    assert_eq!(result.indicator("MA(6)"), Some(116.5));
    assert_eq!(result.indicator("MA(14)"), Some(112.5));
}

#[test]
fn test_sustained_downtrend() {
    let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
    let result = candlecast::analyze(&candles_from_closes(&closes));
    assert_eq!(result.signal, Signal::Sell);
    assert_eq!(result.strength, 60);
}

#[test]
fn test_flat_prices_are_neutral() {
    let result = candlecast::analyze(&candles_from_closes(&[100.0; 30]));
    assert_eq!(result.signal, Signal::Neutral);
    assert_eq!(result.strength, 50);
    assert_eq!(result.indicators.len(), 3);
    assert_eq!(result.indicator("Crossover"), Some(0.0));
    assert_eq!(result.indicators[2].interpretation, "Bearish");
}

#[test]
fn test_tied_previous_averages_give_trend_strength() {
    // Previous averages tie at 100, so a move on the last bar is not a fresh cross.
    let mut closes = vec![100.0; 15];
    closes.push(110.0);
    let result = candlecast::analyze(&candles_from_closes(&closes));
    assert_eq!(result.signal, Signal::Buy);
    assert_eq!(result.strength, 60);

    closes[15] = 90.0;
    let result = candlecast::analyze(&candles_from_closes(&closes));
    assert_eq!(result.signal, Signal::Sell);
    assert_eq!(result.strength, 60);
}

// ============================================================
// HISTORY LENGTH
// ============================================================

#[test]
fn test_short_history_is_neutral_zero() {
    for n in [0, 1, 5, 14] {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let result = candlecast::analyze(&candles_from_closes(&closes));
        assert_eq!(result.signal, Signal::Neutral);
        assert_eq!(result.strength, 0);
        assert!(result.indicators.is_empty());
    }
}

#[test]
fn test_fifteen_candles_is_enough() {
    let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
    let result = candlecast::analyze(&candles_from_closes(&closes));
    assert_eq!(result.signal, Signal::Buy);
    assert_eq!(result.indicators.len(), 3);
}

#[test]
fn test_only_latest_candles_matter() {
    let recent = fresh_bullish_cross();
    let mut longer = candles_from_closes(&[500.0; 40]);
    let offset = longer.last().unwrap().time + Duration::minutes(5);
    longer.extend(recent.iter().map(|c| Candle {
        time: c.time + (offset - recent[0].time),
        ..*c
    }));

    // The slow average needs 15 closes; older history is never read.
    assert_eq!(candlecast::analyze(&longer), candlecast::analyze(&recent));
}

#[test]
fn test_analyze_is_idempotent() {
    let candles = fresh_bearish_cross();
    assert_eq!(candlecast::analyze(&candles), candlecast::analyze(&candles));
}

// ============================================================
// CONFIGURATION AND VALIDATION
// ============================================================

#[test]
fn test_custom_periods() {
    let config = SignalConfig {
        fast: Period::new(3).unwrap(),
        slow: Period::new(8).unwrap(),
        min_history: 9,
    };
    let engine = SignalEngine::new(config).unwrap();

    let closes: Vec<f64> = (0..9).map(|i| 50.0 + i as f64).collect();
    let result = engine.analyze(&candles_from_closes(&closes));
    assert_eq!(result.signal, Signal::Buy);
    assert!(result.indicator("MA(3)").is_some());
    assert!(result.indicator("MA(8)").is_some());
    assert!(result.indicator("MA(6)").is_none());
}

#[test]
fn test_config_from_json() {
    let config: SignalConfig =
        serde_json::from_str(r#"{"fast": 5, "slow": 20, "min_history": 21}"#).unwrap();
    assert_eq!(config.fast.get(), 5);
    assert!(SignalEngine::new(config).is_ok());

    let zero = serde_json::from_str::<SignalConfig>(r#"{"fast": 0, "slow": 20, "min_history": 21}"#);
    assert!(zero.is_err());
}

#[test]
fn test_analyze_checked_rejects_unordered_time() {
    let mut candles = fresh_bullish_cross();
    candles.swap(3, 4);

    let engine = SignalEngine::default();
    let err = engine.analyze_checked(&candles).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::InvalidCandle {
            index: 4,
            reason: "timestamps not strictly increasing"
        }
    );
    // The unchecked path still answers.
    assert_eq!(engine.analyze(&candles).indicators.len(), 3);
}

#[test]
fn test_result_serialization() {
    let result = candlecast::analyze(&fresh_bullish_cross());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["signal"], "BUY");
    assert_eq!(json["strength"], 80);
    assert_eq!(json["indicators"][0]["name"], "MA(6)");
    assert_eq!(json["indicators"][2]["interpretation"], "Bullish");
}
