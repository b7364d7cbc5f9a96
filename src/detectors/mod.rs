//! Chart pattern detectors
//!
//! Every detector looks at the trailing window only and decides on its own;
//! none of them suppresses or depends on another.
//!
//! # Pattern Categories
//!
//! - **Single-bar (3)**: Doji, Hammer, Shooting Star
//! - **Two-bar (2)**: Bullish Engulfing, Bearish Engulfing
//! - **Levels (2)**: Support, Resistance (clustered local extrema)
//! - **Multi-bar (2)**: Double Top, Double Bottom

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod levels;
pub mod multi_bar;
pub mod single_bar;
pub mod two_bar;

pub use helpers::*;
pub use levels::*;
pub use multi_bar::*;
pub use single_bar::*;
pub use two_bar::*;
