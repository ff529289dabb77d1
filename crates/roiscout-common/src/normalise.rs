//! Score normalisation functions.
//! Min-max scaling used by every composite score in the pipeline.

use crate::stats::finite_values;

/// Min-max normalisation: `(x - min) / (max - min)`, clamped to [0, 1].
///
/// When the range is degenerate (`max == min`) or undefined (no finite
/// values), every element maps to 0.0, including missing ones.
/// Otherwise missing elements stay missing.
pub fn minmax_normalise(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let finite = finite_values(series);
    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if finite.is_empty() || hi == lo {
        return vec![Some(0.0); series.len()];
    }

    series
        .iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => Some(((x - lo) / (hi - lo)).clamp(0.0, 1.0)),
            _ => None,
        })
        .collect()
}

/// Reverse mode: `1 - minmax_normalise(x)`, for measures where a lower
/// raw value is better (e.g. affordability).
pub fn minmax_normalise_reversed(series: &[Option<f64>]) -> Vec<Option<f64>> {
    minmax_normalise(series)
        .into_iter()
        .map(|v| v.map(|n| 1.0 - n))
        .collect()
}

/// Min-max normalisation rescaled to a 0–100 score.
pub fn normalise_score(series: &[Option<f64>], reverse: bool) -> Vec<Option<f64>> {
    let normed = if reverse {
        minmax_normalise_reversed(series)
    } else {
        minmax_normalise(series)
    };
    normed.into_iter().map(|v| v.map(|n| n * 100.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_minmax_bounds() {
        let normed = minmax_normalise(&some(&[10.0, 20.0, 30.0, 15.0]));
        assert_eq!(normed[0], Some(0.0)); // min → 0
        assert_eq!(normed[2], Some(1.0)); // max → 1
        assert!((normed[1].unwrap() - 0.5).abs() < 1e-12);
        assert!(normed.iter().all(|v| {
            let x = v.unwrap();
            (0.0..=1.0).contains(&x)
        }));
    }

    #[test]
    fn test_constant_series_is_zero() {
        let normed = minmax_normalise(&some(&[7.0, 7.0, 7.0]));
        assert_eq!(normed, vec![Some(0.0); 3]);
    }

    #[test]
    fn test_tiny_range_is_not_degenerate() {
        let normed = minmax_normalise(&some(&[0.0, 1e-17, 5e-18]));
        assert_eq!(normed[0], Some(0.0));
        assert_eq!(normed[1], Some(1.0));
        assert!((normed[2].unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_all_missing_is_zero() {
        let normed = minmax_normalise(&[None, None, Some(f64::NAN)]);
        assert_eq!(normed, vec![Some(0.0); 3]);
    }

    #[test]
    fn test_missing_stays_missing() {
        let normed = minmax_normalise(&[Some(1.0), None, Some(3.0)]);
        assert_eq!(normed, vec![Some(0.0), None, Some(1.0)]);
    }

    #[test]
    fn test_reversed() {
        let normed = minmax_normalise_reversed(&some(&[100.0, 200.0]));
        assert_eq!(normed, vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_score_scale() {
        let scored = normalise_score(&some(&[0.0, 5.0, 10.0]), false);
        assert_eq!(scored, vec![Some(0.0), Some(50.0), Some(100.0)]);
    }
}
