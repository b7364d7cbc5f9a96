//! Tunable detector thresholds
//!
//! Every builtin detector publishes the thresholds it reads, with defaults
//! and a search range, so callers can rebuild detectors from a plain map of
//! values or sweep a grid of them.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use candlecast::params::{ParamMeta, ParameterizedDetector};
//! use candlecast::prelude::*;
//!
//! for param in SupportLevelDetector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let mut values = HashMap::new();
//! values.insert("tolerance", 0.001);
//! let wider = SupportLevelDetector::with_params(&values).unwrap();
//! assert_eq!(wider.tolerance.get(), 0.001);
//! ```

use std::collections::HashMap;

use crate::{AnalysisError, Period, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Kind of value a parameter holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Fraction in 0.0..=1.0
  Ratio,
  /// Candle count, positive integer
  Period,
}

/// Description of one detector threshold
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Field name, also the key accepted by `with_params`
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Search range: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Values from `min` to `max` inclusive, `step` apart
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    if step <= 0.0 {
      return vec![min];
    }
    let steps = ((max - min) / step + 1e-9).floor() as usize;
    (0..=steps).map(|i| min + step * i as f64).collect()
  }

  /// Check a value against the search range and the parameter kind
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if !(min..=max).contains(&value) {
      return Err(AnalysisError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(AnalysisError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Detectors that can be rebuilt from a map of threshold values
pub trait ParameterizedDetector: Sized {
  fn param_meta() -> &'static [ParamMeta];

  /// Missing keys fall back to the defaults.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  fn pattern_id_str() -> &'static str;

  /// Map of every parameter at its default value
  fn default_params() -> HashMap<&'static str, f64> {
    Self::param_meta().iter().map(|m| (m.name, m.default)).collect()
  }

  /// One detector per point of the cartesian grid over all parameters.
  ///
  /// Combinations the detector rejects are skipped.
  fn grid() -> Vec<Self> {
    let mut combos: Vec<HashMap<&str, f64>> = vec![HashMap::new()];
    for meta in Self::param_meta() {
      let values = meta.generate_grid();
      combos = combos
        .into_iter()
        .flat_map(|combo| {
          values.iter().map(move |&v| {
            let mut next = combo.clone();
            next.insert(meta.name, v);
            next
          })
        })
        .collect();
    }
    combos.iter().filter_map(|c| Self::with_params(c).ok()).collect()
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Ratio from `params[key]`, or `default` when absent
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  Ratio::new(params.get(key).copied().unwrap_or(default))
}

/// Period from `params[key]`, or `default` when absent
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  match params.get(key).copied() {
    None => Period::new(default),
    Some(v) if v >= 1.0 && v.fract() == 0.0 => Period::new(v as usize),
    Some(_) => Err(AnalysisError::InvalidValue("Period must be a positive integer")),
  }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;
  use crate::detectors::{
    DojiDetector, DoubleBottomDetector, DoubleTopDetector, HammerDetector, SupportLevelDetector,
  };

  #[test]
  fn test_param_meta_constructors() {
    let meta = ParamMeta::ratio("tolerance", 0.0005, (0.0001, 0.002, 0.0001), "Level tolerance");
    assert_eq!(meta.name, "tolerance");
    assert_eq!(meta.param_type, ParamType::Ratio);

    let meta = ParamMeta::period("lookback", 15.0, (10.0, 30.0, 5.0), "Bars examined");
    assert_eq!(meta.param_type, ParamType::Period);
    assert_eq!(meta.default, 15.0);
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::period("lookback", 15.0, (10.0, 30.0, 5.0), "Bars examined");
    assert_eq!(meta.generate_grid(), vec![10.0, 15.0, 20.0, 25.0, 30.0]);

    let meta = ParamMeta::ratio("r", 0.3, (0.2, 0.4, 0.05), "r");
    let grid = meta.generate_grid();
    assert_eq!(grid.len(), 5);
    assert!((grid[4] - 0.4).abs() < 1e-9);
  }

  #[test]
  fn test_validate() {
    let meta = ParamMeta::period("lookback", 15.0, (10.0, 30.0, 5.0), "Bars examined");
    assert!(meta.validate(15.0).is_ok());
    assert!(meta.validate(12.5).is_err());
    assert!(meta.validate(35.0).is_err());

    let meta = ParamMeta::ratio("r", 0.1, (0.05, 0.2, 0.05), "r");
    assert!(meta.validate(0.1).is_ok());
    assert!(meta.validate(0.3).is_err());
  }

  #[test]
  fn test_defaults_match_detector_defaults() {
    let d = DojiDetector::with_params(&DojiDetector::default_params()).unwrap();
    assert_eq!(d.max_body_ratio, DojiDetector::default().max_body_ratio);

    let h = HammerDetector::with_params(&HashMap::new()).unwrap();
    assert_eq!(h.min_shadow_ratio, HammerDetector::default().min_shadow_ratio);

    let t = DoubleTopDetector::with_params(&DoubleTopDetector::default_params()).unwrap();
    assert_eq!(t.lookback, DoubleTopDetector::default().lookback);
  }

  #[test]
  fn test_grid_size() {
    // 20 tolerance steps from 0.0001 to 0.002
    assert_eq!(SupportLevelDetector::grid().len(), 20);
    // 5 lookbacks x 5 separations x 6 diffs, none rejected
    assert_eq!(DoubleBottomDetector::grid().len(), 150);
  }

  #[test]
  fn test_get_ratio_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 0.8);

    assert_eq!(get_ratio(&params, "key1", 0.5).unwrap().get(), 0.8);
    assert_eq!(get_ratio(&params, "key2", 0.5).unwrap().get(), 0.5);
    params.insert("key3", 1.5);
    assert!(get_ratio(&params, "key3", 0.5).is_err());
  }

  #[test]
  fn test_get_period_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 20.0);
    params.insert("key2", 2.5);

    assert_eq!(get_period(&params, "key1", 14).unwrap().get(), 20);
    assert_eq!(get_period(&params, "missing", 14).unwrap().get(), 14);
    assert!(get_period(&params, "key2", 14).is_err());
  }
}
