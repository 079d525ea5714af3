//! Positional rolling-window helpers shared by the feature stages.
//!
//! Every helper reads a slice and returns a new vector of the same length.
//! Missing values are `f64::NAN`. A statistic at row `i` only reads rows
//! `..=i`, and is missing while its window is incomplete or contains a
//! missing value. Each window is summed from scratch rather than updated
//! incrementally, so results do not drift with series length.

/// Sentinel for a value that cannot be computed at this row
pub const MISSING: f64 = f64::NAN;

/// Whether a feature value is the missing sentinel
#[inline]
pub fn is_missing(value: f64) -> bool {
    value.is_nan()
}

/// Map positive or negative infinity to the missing sentinel
#[inline]
pub fn finite_or_missing(value: f64) -> f64 {
    if value.is_infinite() {
        MISSING
    } else {
        value
    }
}

/// Replace every infinity in place
pub fn scrub_infinite(values: &mut [f64]) {
    for value in values.iter_mut() {
        *value = finite_or_missing(*value);
    }
}

/// The trailing window ending at `index`, if complete and fully present
fn window(values: &[f64], index: usize, size: usize) -> Option<&[f64]> {
    if size == 0 || index + 1 < size {
        return None;
    }
    let slice = &values[index + 1 - size..=index];
    if slice.iter().any(|v| is_missing(*v)) {
        None
    } else {
        Some(slice)
    }
}

fn mean(slice: &[f64]) -> f64 {
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// Sample standard deviation (N-1 denominator)
fn sample_std(slice: &[f64]) -> Option<f64> {
    if slice.len() < 2 {
        return None;
    }
    let mean_val = mean(slice);
    let variance_sum = slice.iter().map(|x| (x - mean_val).powi(2)).sum::<f64>();
    Some((variance_sum / (slice.len() - 1) as f64).sqrt())
}

/// Fractional change over `period` rows: `v[i] / v[i - period] - 1`
pub fn pct_change(values: &[f64], period: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            if period == 0 || i < period {
                return MISSING;
            }
            let base = values[i - period];
            if is_missing(base) || is_missing(current) {
                MISSING
            } else {
                finite_or_missing(current / base - 1.0)
            }
        })
        .collect()
}

/// Difference over `lag` rows: `v[i] - v[i - lag]`
pub fn diff(values: &[f64], lag: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            if lag == 0 || i < lag {
                MISSING
            } else {
                // NaN operands propagate
                current - values[i - lag]
            }
        })
        .collect()
}

/// Arithmetic mean of the trailing `period` rows
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| window(values, i, period).map_or(MISSING, mean))
        .collect()
}

/// Sample standard deviation of the trailing `period` rows.
///
/// A single-row window has no sample deviation and stays missing.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            window(values, i, period)
                .and_then(sample_std)
                .unwrap_or(MISSING)
        })
        .collect()
}

/// Z-score of each value against its trailing window, inclusive of itself.
///
/// A window with zero deviation yields missing, never an infinity.
pub fn rolling_zscore(values: &[f64], period: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let Some(slice) = window(values, i, period) else {
                return MISSING;
            };
            match sample_std(slice) {
                Some(std) if std > 0.0 => finite_or_missing((values[i] - mean(slice)) / std),
                _ => MISSING,
            }
        })
        .collect()
}

/// Number of missing values in a column
pub fn count_missing(values: &[f64]) -> usize {
    values.iter().filter(|v| is_missing(**v)).count()
}
