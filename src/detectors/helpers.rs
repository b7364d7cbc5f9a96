//! Shared thresholds and scans for the detector modules.

// ============================================================
// THRESHOLDS
// ============================================================

/// Doji: body / range below this
pub const DOJI_BODY_RATIO: f64 = 0.1;
/// Hammer / shooting star: body / range below this
pub const SMALL_BODY_RATIO: f64 = 0.3;
/// Hammer / shooting star: dominant shadow / range above this
pub const LONG_SHADOW_RATIO: f64 = 0.6;
/// Relative distance under which two extrema belong to the same level (5 bp)
pub const LEVEL_TOLERANCE: f64 = 0.0005;
/// Shortest window the level scans accept
pub const LEVEL_MIN_BARS: usize = 10;
/// Bars examined for double tops and bottoms
pub const DOUBLE_LOOKBACK: usize = 15;
/// Minimum index distance between the two matched extrema
pub const DOUBLE_MIN_SEPARATION: usize = 3;
/// Maximum relative height difference between the two matched extrema
pub const DOUBLE_MAX_DIFF: f64 = 0.01;
/// Neighbours compared on each side of a candidate extremum
pub const EXTREMUM_SPAN: usize = 2;

// ============================================================
// RATIOS
// ============================================================

/// `part / range`, or `None` when the range is exactly zero.
///
/// Negative ranges (malformed bars) pass through unchanged.
#[inline]
pub fn range_ratio(part: f64, range: f64) -> Option<f64> {
    (range != 0.0).then(|| part / range)
}

/// Fixed-point text with `digits` decimals, exact ties rounded away from zero.
///
/// `format!("{:.N}")` breaks exact ties to even (12.125 -> "12.12"); pattern
/// descriptions round them up ("12.13").
pub fn to_fixed(value: f64, digits: usize) -> String {
    let magnitude = value.abs();
    if !magnitude.is_finite() {
        return format!("{value:.digits$}");
    }

    // 1074 fractional digits hold any f64 exactly.
    let exact = format!("{magnitude:.1074}");
    let tie = exact.split_once('.').is_some_and(|(_, frac)| {
        frac.get(digits..)
            .is_some_and(|rest| rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0'))
    });
    let rounded = if tie {
        // Next representable value up leaves the tie.
        f64::from_bits(magnitude.to_bits() + 1)
    } else {
        magnitude
    };

    let text = format!("{rounded:.digits$}");
    if value < 0.0 {
        format!("-{text}")
    } else {
        text
    }
}

// ============================================================
// LOCAL EXTREMA
// ============================================================

/// Which side of the series an extremum sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Low,
    High,
}

impl Extremum {
    #[inline]
    fn beats_or_ties(self, candidate: f64, neighbour: f64) -> bool {
        match self {
            Extremum::Low => candidate <= neighbour,
            Extremum::High => candidate >= neighbour,
        }
    }

    #[inline]
    fn beats(self, candidate: f64, neighbour: f64) -> bool {
        match self {
            Extremum::Low => candidate < neighbour,
            Extremum::High => candidate > neighbour,
        }
    }
}

fn scan_extrema(values: &[f64], cmp: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    if values.len() < 2 * EXTREMUM_SPAN + 1 {
        return Vec::new();
    }
    (EXTREMUM_SPAN..values.len() - EXTREMUM_SPAN)
        .filter(|&i| {
            (1..=EXTREMUM_SPAN)
                .all(|d| cmp(values[i], values[i - d]) && cmp(values[i], values[i + d]))
        })
        .collect()
}

/// Indices at least as low (or high) as their two neighbours on each side.
///
/// Ties count, so a flat stretch yields several adjacent extrema.
pub fn inclusive_extrema(values: &[f64], kind: Extremum) -> Vec<usize> {
    scan_extrema(values, |c, n| kind.beats_or_ties(c, n))
}

/// Indices strictly lower (or higher) than their two neighbours on each side.
pub fn strict_extrema(values: &[f64], kind: Extremum) -> Vec<usize> {
    scan_extrema(values, |c, n| kind.beats(c, n))
}

// ============================================================
// LEVEL CLUSTERING
// ============================================================

/// Greedy clustering of price levels.
///
/// Each level joins the first cluster within `tolerance` (relative to the
/// incoming level) and the cluster becomes the mean of the two; otherwise it
/// opens a new cluster. Order of first appearance is kept.
pub fn cluster_levels(levels: &[f64], tolerance: f64) -> Vec<f64> {
    let mut clusters: Vec<f64> = Vec::new();
    for &level in levels {
        match clusters
            .iter_mut()
            .find(|c| (level - **c).abs() / level < tolerance)
        {
            Some(cluster) => *cluster = (*cluster + level) / 2.0,
            None => clusters.push(level),
        }
    }
    clusters
}

/// Highest level strictly below `price`
pub fn nearest_below(levels: &[f64], price: f64) -> Option<f64> {
    levels
        .iter()
        .copied()
        .filter(|&l| l < price)
        .reduce(f64::max)
}

/// Lowest level strictly above `price`
pub fn nearest_above(levels: &[f64], price: f64) -> Option<f64> {
    levels
        .iter()
        .copied()
        .filter(|&l| l > price)
        .reduce(f64::min)
}

// ============================================================
// DOUBLE EXTREMA
// ============================================================

/// Whether the two most extreme strict extrema of `values` form a double
/// top (`High`) or double bottom (`Low`): at least `min_separation` bars apart
/// and within `max_diff` of each other, relative to the more extreme one.
pub fn matched_extrema(
    values: &[f64],
    kind: Extremum,
    min_separation: usize,
    max_diff: f64,
) -> bool {
    let mut idx = strict_extrema(values, kind);
    if idx.len() < 2 {
        return false;
    }

    // Stable: on equal values the earlier index ranks first.
    idx.sort_by(|&a, &b| {
        let ord = values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal);
        match kind {
            Extremum::Low => ord,
            Extremum::High => ord.reverse(),
        }
    });
    let (first, second) = (idx[0], idx[1]);

    if first.abs_diff(second) < min_separation {
        return false;
    }

    (values[first] - values[second]).abs() / values[first] < max_diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_ratio_guards_zero() {
        assert_eq!(range_ratio(1.0, 0.0), None);
        assert_eq!(range_ratio(1.0, 4.0), Some(0.25));
        assert_eq!(range_ratio(1.0, -4.0), Some(-0.25));
    }

    #[test]
    fn test_to_fixed_rounds_ties_up() {
        assert_eq!(to_fixed(12.125, 2), "12.13");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(1.015625, 5), "1.01563");
        assert_eq!(to_fixed(-12.125, 2), "-12.13");
    }

    #[test]
    fn test_to_fixed_non_ties() {
        // 2.675 is stored just below the midpoint.
        assert_eq!(to_fixed(2.675, 2), "2.67");
        assert_eq!(to_fixed(95.01, 5), "95.01000");
        assert_eq!(to_fixed(8.2029, 2), "8.20");
        assert_eq!(to_fixed(0.0, 2), "0.00");
    }

    #[test]
    fn test_inclusive_extrema_counts_ties() {
        let flat = [5.0; 7];
        assert_eq!(inclusive_extrema(&flat, Extremum::Low), vec![2, 3, 4]);
        assert_eq!(inclusive_extrema(&flat, Extremum::High), vec![2, 3, 4]);
    }

    #[test]
    fn test_strict_extrema_ignores_ties() {
        let flat = [5.0; 7];
        assert!(strict_extrema(&flat, Extremum::Low).is_empty());

        let v = [3.0, 2.0, 1.0, 2.0, 4.0, 2.0, 3.0];
        assert_eq!(strict_extrema(&v, Extremum::Low), vec![2]);
        assert_eq!(strict_extrema(&v, Extremum::High), vec![4]);
    }

    #[test]
    fn test_extrema_short_input() {
        assert!(inclusive_extrema(&[1.0, 2.0, 3.0, 4.0], Extremum::Low).is_empty());
        assert!(strict_extrema(&[], Extremum::High).is_empty());
    }

    #[test]
    fn test_cluster_levels_merges_by_averaging() {
        let clusters = cluster_levels(&[1.1000, 1.1004, 1.2000], LEVEL_TOLERANCE);
        assert_eq!(clusters.len(), 2);
        assert!((clusters[0] - 1.1002).abs() < 1e-12);
        assert_eq!(clusters[1], 1.2);
    }

    #[test]
    fn test_cluster_levels_first_match_wins() {
        // 1.10055 is within 5bp of both clusters; it joins the first.
        let clusters = cluster_levels(&[1.1000, 1.1010, 1.10055], LEVEL_TOLERANCE);
        assert_eq!(clusters.len(), 2);
        assert!((clusters[0] - 1.100275).abs() < 1e-12);
        assert_eq!(clusters[1], 1.1010);
    }

    #[test]
    fn test_nearest_levels() {
        let levels = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(nearest_below(&levels, 2.5), Some(2.0));
        assert_eq!(nearest_above(&levels, 2.5), Some(3.0));
        assert_eq!(nearest_below(&levels, 1.0), None);
        assert_eq!(nearest_above(&levels, 4.0), None);
    }

    #[test]
    fn test_matched_extrema_separation_and_height() {
        let mut highs = [100.0; 15];
        highs[3] = 105.0;
        highs[8] = 104.8;
        assert!(matched_extrema(&highs, Extremum::High, 3, 0.01));
        // Too far apart in height
        highs[8] = 103.0;
        assert!(!matched_extrema(&highs, Extremum::High, 3, 0.01));
        // Needs more separation than available
        highs[8] = 105.0;
        assert!(!matched_extrema(&highs, Extremum::High, 6, 0.01));
    }

    #[test]
    fn test_matched_extrema_picks_two_most_extreme() {
        let mut lows = [100.0; 15];
        lows[3] = 95.0;
        lows[7] = 98.0;
        lows[11] = 95.5;
        // 95.0 and 95.5 are the two lowest; 98.0 is ignored.
        assert!(matched_extrema(&lows, Extremum::Low, 3, 0.01));
    }
}
