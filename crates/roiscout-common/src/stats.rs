//! Summary statistics over numeric columns.
//!
//! Every function here skips missing and non-finite values, so a column
//! can be passed straight from a [`FeatureTable`](crate::FeatureTable).

/// Collect the finite values of a column, dropping missing entries.
pub fn finite_values(column: &[Option<f64>]) -> Vec<f64> {
    column
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect()
}

/// Quantile with linear interpolation between order statistics:
/// position `q * (n - 1)` in the sorted values.
/// Returns None for an empty input or `q` outside [0, 1].
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    Some(finite.iter().sum::<f64>() / finite.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
/// Undefined for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let m = finite.iter().sum::<f64>() / finite.len() as f64;
    let var = finite.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (finite.len() - 1) as f64;
    Some(var.sqrt())
}

pub fn column_median(column: &[Option<f64>]) -> Option<f64> {
    median(&finite_values(column))
}

/// Fill missing entries with the column median, or 0 when the column
/// holds no finite value at all.
pub fn impute_median(column: &[Option<f64>]) -> Vec<f64> {
    let fill = column_median(column).unwrap_or(0.0);
    column
        .iter()
        .map(|v| match v {
            Some(x) if x.is_finite() => *x,
            _ => fill,
        })
        .collect()
}

/// Round half away from zero to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
