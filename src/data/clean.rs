//! Chronological normalization of raw bars.

use tracing::debug;

use super::series::PriceSeries;

/// Sort bars by timestamp ascending.
///
/// The sort is stable, so bars sharing a timestamp keep their relative
/// order. No value is changed and no row is added or dropped: gaps are not
/// reindexed and duplicates are not merged.
pub fn normalize(series: PriceSeries) -> PriceSeries {
    let mut bars = series.into_bars();
    let sorted = bars.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp);
    if !sorted {
        debug!(rows = bars.len(), "sorting bars by timestamp");
        bars.sort_by_key(|bar| bar.timestamp);
    }
    PriceSeries::new(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceBar;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        let date = NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
        PriceBar::new(date, close, close, close, close, 0.0)
    }

    #[test]
    fn test_normalize_sorts_ascending() {
        let series = PriceSeries::new(vec![bar(3, 102.0), bar(1, 100.0), bar(2, 101.0)]);
        let sorted = normalize(series);
        assert_eq!(sorted.close(), vec![100.0, 101.0, 102.0]);
        let dates = sorted.timestamps();
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_normalize_is_stable_for_duplicates() {
        let series = PriceSeries::new(vec![bar(2, 1.0), bar(1, 0.0), bar(2, 2.0)]);
        let sorted = normalize(series);
        assert_eq!(sorted.close(), vec![0.0, 1.0, 2.0]);
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn test_normalize_keeps_gaps() {
        let series = PriceSeries::new(vec![bar(1, 1.0), bar(9, 2.0)]);
        let sorted = normalize(series.clone());
        assert_eq!(sorted, series);
    }
}
