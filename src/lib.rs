//! # candlecast
//!
//! Moving-average crossover signals and chart pattern detection over a
//! sequence of OHLCV candles.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlecast::prelude::*;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
//! let candles: Vec<Candle> = (0..30)
//!     .map(|i| {
//!         let base = 1.05 + i as f64 * 0.001;
//!         Candle::new(start + Duration::minutes(i), base, base + 0.002, base - 0.001, base + 0.001, 700)
//!     })
//!     .collect();
//!
//! let analysis = candlecast::analyze(&candles);
//! assert_eq!(analysis.signal, Signal::Buy);
//!
//! let patterns = candlecast::detect(&candles);
//! for p in &patterns {
//!     println!("{} ({}): {}", p.name, p.bias, p.description);
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

pub mod detectors;
pub mod params;
pub mod signal;

pub use signal::{ema, sma, AnalysisResult, Indicator, Signal, SignalConfig, SignalEngine};

pub mod prelude {
    pub use crate::{
        // Detectors
        detectors::*,
        // Parameters
        params::{get_period, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
        // Signal
        signal::{ema, sma, AnalysisResult, Indicator, Signal, SignalConfig, SignalEngine},
        // Batch
        analyze_parallel,
        validate_candles,
        Analyzer,
        // Engine
        BuiltinDetector,
        // Types
        Candle,
        Direction,
        // Core traits
        DynPatternDetector,
        EngineBuilder,
        EngineConfig,
        InstrumentError,
        InstrumentReport,
        OHLCVExt,
        PatternDetector,
        PatternEngine,
        // Errors
        AnalysisError,
        PatternId,
        PatternKind,
        Period,
        Ratio,
        Report,
        Result,
        TimeFrame,
        TradingPattern,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised by configuration and opt-in data validation.
///
/// The core entry points ([`analyze`], [`detect`]) never return these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Fraction in 0.0..=1.0, used for detector thresholds and tolerances
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Checked constructor, rejects NaN, infinities and values outside [0, 1]
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(AnalysisError::InvalidValue("Ratio must be finite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Unchecked constructor for the library's own constants
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        Ratio::new(f64::deserialize(d)?).map_err(serde::de::Error::custom)
    }
}

/// Number of candles (always > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        Period::new(usize::deserialize(d)?).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Read access to one price bar
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Bar open time in epoch milliseconds, when the source carries one
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

impl OHLCV for &dyn OHLCV {
    fn open(&self) -> f64 {
        (*self).open()
    }

    fn high(&self) -> f64 {
        (*self).high()
    }

    fn low(&self) -> f64 {
        (*self).low()
    }

    fn close(&self) -> f64 {
        (*self).close()
    }

    fn volume(&self) -> f64 {
        (*self).volume()
    }

    fn timestamp(&self) -> Option<i64> {
        (*self).timestamp()
    }
}

/// Candle geometry derived from the raw prices
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    /// `high - low`; negative for malformed bars
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Body as a fraction of the range. `None` when the range is exactly zero.
    #[inline]
    fn body_ratio(&self) -> Option<f64> {
        detectors::helpers::range_ratio(self.body(), self.range())
    }

    #[inline]
    fn upper_shadow_ratio(&self) -> Option<f64> {
        detectors::helpers::range_ratio(self.upper_shadow(), self.range())
    }

    #[inline]
    fn lower_shadow_ratio(&self) -> Option<f64> {
        detectors::helpers::range_ratio(self.lower_shadow(), self.range())
    }

    /// Check one bar for NaN/infinite prices and an inverted range
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(AnalysisError::InvalidCandle {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(AnalysisError::InvalidCandle {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.high() < self.low() {
            return Err(AnalysisError::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        if self.volume() < 0.0 {
            return Err(AnalysisError::InvalidCandle {
                index: 0,
                reason: "negative volume",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Validate a whole sequence: every bar via [`OHLCVExt::validate`], plus
/// strictly increasing timestamps where both neighbours carry one.
pub fn validate_candles<T: OHLCV>(candles: &[T]) -> Result<()> {
    let mut prev_ts: Option<i64> = None;
    for (index, candle) in candles.iter().enumerate() {
        candle.validate().map_err(|e| match e {
            AnalysisError::InvalidCandle { reason, .. } => {
                AnalysisError::InvalidCandle { index, reason }
            }
            other => other,
        })?;

        let ts = candle.timestamp();
        if let (Some(prev), Some(curr)) = (prev_ts, ts) {
            if curr <= prev {
                return Err(AnalysisError::InvalidCandle {
                    index,
                    reason: "timestamps not strictly increasing",
                });
            }
        }
        prev_ts = ts;
    }
    Ok(())
}

// ============================================================
// CANDLES
// ============================================================

/// One OHLCV bar as delivered by the market data provider
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    pub fn new(time: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume as f64
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.time.timestamp_millis())
    }
}

/// Bar interval served by the data provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TimeFrame {
    #[serde(rename = "1m")]
    M1,
    #[default]
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 4] = [TimeFrame::M1, TimeFrame::M5, TimeFrame::M15, TimeFrame::M30];

    #[inline]
    pub fn minutes(self) -> u32 {
        match self {
            TimeFrame::M1 => 1,
            TimeFrame::M5 => 5,
            TimeFrame::M15 => 15,
            TimeFrame::M30 => 30,
        }
    }

    #[inline]
    pub fn duration(self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.minutes()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeFrame::M1 => "1m",
            TimeFrame::M5 => "5m",
            TimeFrame::M15 => "15m",
            TimeFrame::M30 => "30m",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        TimeFrame::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| AnalysisError::InvalidConfig(format!("unknown timeframe: {s}")))
    }
}

// ============================================================
// TRADING PATTERN - result of detection
// ============================================================

/// Stable identifier of a detector, used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Directional bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Bullish => "Bullish",
            Direction::Neutral => "Neutral",
            Direction::Bearish => "Bearish",
        })
    }
}

/// What kind of cue a pattern gives
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Bullish,
    Bearish,
    Reversal,
    Continuation,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatternKind::Bullish => "bullish",
            PatternKind::Bearish => "bearish",
            PatternKind::Reversal => "reversal",
            PatternKind::Continuation => "continuation",
        })
    }
}

/// A pattern found in the trailing window
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TradingPattern {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub bias: Direction,
    pub description: String,
}

impl TradingPattern {
    pub fn new(
        name: impl Into<String>,
        kind: PatternKind,
        bias: Direction,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            bias,
            description: description.into(),
        }
    }
}

// ============================================================
// PATTERN DETECTOR TRAITS
// ============================================================

/// Generic pattern detector trait - for concrete types.
///
/// `window` is the trailing slice the engine hands out (oldest first); the
/// last element is the bar being evaluated.
pub trait PatternDetector: Send + Sync {
    fn id(&self) -> PatternId;

    /// Smallest window this detector can say anything about
    fn min_bars(&self) -> usize;

    fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

/// Object-safe pattern detector trait - for custom detectors
pub trait DynPatternDetector: Send + Sync {
    fn id(&self) -> PatternId;
    fn min_bars(&self) -> usize;
    fn detect(&self, window: &[&dyn OHLCV]) -> Option<TradingPattern>;
    fn validate_config(&self) -> Result<()>;
}

impl<D: PatternDetector> DynPatternDetector for D {
    fn id(&self) -> PatternId {
        PatternDetector::id(self)
    }

    fn min_bars(&self) -> usize {
        PatternDetector::min_bars(self)
    }

    fn detect(&self, window: &[&dyn OHLCV]) -> Option<TradingPattern> {
        PatternDetector::detect(self, window)
    }

    fn validate_config(&self) -> Result<()> {
        PatternDetector::validate_config(self)
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// Builtin detectors - enum dispatch, no vtable
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            /// Every builtin with default thresholds, in evaluation order
            pub fn all_defaults() -> Vec<BuiltinDetector> {
                vec![$(BuiltinDetector::$variant(<$detector>::default())),*]
            }

            #[inline]
            pub fn detect<T: OHLCV>(&self, window: &[T]) -> Option<TradingPattern> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, window)),*
                }
            }

            #[inline]
            pub fn id(&self) -> PatternId {
                match self {
                    $(Self::$variant(d) => PatternDetector::id(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_bars(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

// Evaluation order is the order of the emitted patterns.
define_builtin_detectors! {
    Doji(DojiDetector),
    BullishEngulfing(BullishEngulfingDetector),
    BearishEngulfing(BearishEngulfingDetector),
    SupportLevel(SupportLevelDetector),
    ResistanceLevel(ResistanceLevelDetector),
    Hammer(HammerDetector),
    ShootingStar(ShootingStarDetector),
    DoubleTop(DoubleTopDetector),
    DoubleBottom(DoubleBottomDetector),
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Below this many candles, detection returns nothing
    pub min_candles: usize,
    /// Size of the trailing window handed to detectors
    pub window: Period,
    /// Run only these detectors when set
    #[serde(skip)]
    pub pattern_filter: Option<Vec<PatternId>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_candles: 10,
            window: Period::new_const(20),
            pattern_filter: None,
        }
    }
}

/// Runs every registered detector over the trailing window
pub struct PatternEngine {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: EngineConfig,
}

impl Default for PatternEngine {
    /// All nine builtins with default thresholds
    fn default() -> Self {
        Self {
            builtin: BuiltinDetector::all_defaults(),
            custom: Vec::new(),
            config: EngineConfig::default(),
        }
    }
}

impl fmt::Debug for PatternEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternEngine")
            .field("builtin", &self.builtin)
            .field("custom", &self.custom.iter().map(|d| d.id()).collect::<Vec<_>>())
            .field("config", &self.config)
            .finish()
    }
}

impl PatternEngine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ids of the registered detectors, in evaluation order
    pub fn detector_ids(&self) -> Vec<PatternId> {
        self.builtin
            .iter()
            .map(|d| d.id())
            .chain(self.custom.iter().map(|d| d.id()))
            .collect()
    }

    /// Detect patterns at the end of `candles`.
    ///
    /// Returns an empty list when fewer than `min_candles` candles are given.
    /// Never validates the input; see [`PatternEngine::detect_checked`].
    pub fn detect<T: OHLCV>(&self, candles: &[T]) -> Vec<TradingPattern> {
        if candles.len() < self.config.min_candles {
            debug!(
                candles = candles.len(),
                required = self.config.min_candles,
                "not enough candles for pattern detection"
            );
            return Vec::new();
        }

        let start = candles.len().saturating_sub(self.config.window.get());
        let recent = &candles[start..];
        let patterns = self.detect_window(recent);
        debug!(
            window = recent.len(),
            found = patterns.len(),
            "pattern detection finished"
        );
        patterns
    }

    /// Validate the candles, then [`PatternEngine::detect`]
    pub fn detect_checked<T: OHLCV>(&self, candles: &[T]) -> Result<Vec<TradingPattern>> {
        if let Err(e) = validate_candles(candles) {
            warn!(error = %e, "rejecting candles before pattern detection");
            return Err(e);
        }
        Ok(self.detect(candles))
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn detect_window<T: OHLCV>(&self, recent: &[T]) -> Vec<TradingPattern> {
        let mut results = Vec::new();

        // Fast path: builtin detectors (enum dispatch, no vtable)
        for detector in &self.builtin {
            if recent.len() >= detector.min_bars() && self.is_enabled(detector.id()) {
                if let Some(p) = detector.detect(recent) {
                    trace!(pattern = %p.name, "pattern matched");
                    results.push(p);
                }
            }
        }

        // Slow path: custom detectors (vtable)
        if !self.custom.is_empty() {
            let bar_refs: Vec<&dyn OHLCV> = recent.iter().map(|b| b as &dyn OHLCV).collect();
            for detector in &self.custom {
                if bar_refs.len() >= detector.min_bars() && self.is_enabled(detector.id()) {
                    if let Some(p) = detector.detect(&bar_refs) {
                        trace!(pattern = %p.name, "custom pattern matched");
                        results.push(p);
                    }
                }
            }
        }

        results
    }

    fn is_enabled(&self, id: PatternId) -> bool {
        match self.config.pattern_filter {
            Some(ref filter) => filter.contains(&id),
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        for d in &self.builtin {
            d.validate_config()?;
        }
        for d in &self.custom {
            d.validate_config()?;
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for [`PatternEngine`]
pub struct EngineBuilder {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: EngineConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Empty builder; add detectors before building
    pub fn new() -> Self {
        Self {
            builtin: Vec::new(),
            custom: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    /// Add all nine builtin detectors with default thresholds
    pub fn with_all_defaults(mut self) -> Self {
        self.builtin.extend(BuiltinDetector::all_defaults());
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.builtin.push(detector);
        Ok(self)
    }

    /// Add a custom detector (slow path, runs after the builtins)
    pub fn add_custom<D: DynPatternDetector + 'static>(mut self, detector: D) -> Self {
        self.custom.push(Box::new(detector));
        self
    }

    /// Minimum sequence length before any detector runs
    pub fn min_candles(mut self, n: usize) -> Self {
        self.config.min_candles = n;
        self
    }

    /// Trailing window size handed to detectors
    pub fn window(mut self, window: Period) -> Self {
        self.config.window = window;
        self
    }

    /// Filter to specific patterns only
    pub fn only_patterns(mut self, ids: impl IntoIterator<Item = PatternId>) -> Self {
        self.config.pattern_filter = Some(ids.into_iter().collect());
        self
    }

    /// Replace the whole config
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let engine = PatternEngine {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// ANALYZER - signal + patterns in one report
// ============================================================

/// Combined output of one analysis call
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Report {
    pub analysis: AnalysisResult,
    pub patterns: Vec<TradingPattern>,
}

/// Runs the signal engine, then the pattern engine, over the same candles
#[derive(Debug, Default)]
pub struct Analyzer {
    signal: SignalEngine,
    patterns: PatternEngine,
    validate_data: bool,
}

impl Analyzer {
    pub fn new(signal: SignalEngine, patterns: PatternEngine) -> Self {
        Self {
            signal,
            patterns,
            validate_data: false,
        }
    }

    /// Enable/disable candle validation before analysis
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.validate_data = enable;
        self
    }

    pub fn signal_engine(&self) -> &SignalEngine {
        &self.signal
    }

    pub fn pattern_engine(&self) -> &PatternEngine {
        &self.patterns
    }

    /// Analyze one candle sequence.
    ///
    /// Fails only when validation is enabled and rejects the input.
    pub fn run<T: OHLCV>(&self, candles: &[T]) -> Result<Report> {
        if self.validate_data {
            if let Err(e) = validate_candles(candles) {
                warn!(error = %e, "rejecting candles before analysis");
                return Err(e);
            }
        }

        Ok(Report {
            analysis: self.signal.analyze(candles),
            patterns: self.patterns.detect(candles),
        })
    }
}

// ============================================================
// PARALLEL BATCH
// ============================================================

use rayon::prelude::*;

/// Report for a single instrument
#[derive(Debug)]
pub struct InstrumentReport {
    pub symbol: String,
    pub report: Report,
}

/// Error from analysing a single instrument
#[derive(Debug)]
pub struct InstrumentError {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Analyze many independent `(symbol, candles)` sequences in parallel.
///
/// Output order follows input order within each list.
pub fn analyze_parallel<'a, T, I>(
    analyzer: &Analyzer,
    instruments: I,
) -> (Vec<InstrumentReport>, Vec<InstrumentError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, candles)| {
            analyzer
                .run(candles)
                .map(|report| InstrumentReport {
                    symbol: symbol.to_string(),
                    report,
                })
                .map_err(|error| InstrumentError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// ENTRY POINTS
// ============================================================

/// Crossover signal with the default 6/14 configuration
pub fn analyze<T: OHLCV>(candles: &[T]) -> AnalysisResult {
    SignalEngine::default().analyze(candles)
}

/// All nine default detectors over the trailing 20 candles
pub fn detect<T: OHLCV>(candles: &[T]) -> Vec<TradingPattern> {
    PatternEngine::default().detect(candles)
}

// ============================================================
// TESTS
// ============================================================
