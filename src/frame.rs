//! Polars bridge for tabular callers.
//!
//! A caller holding a `DataFrame` with a date column and the base OHLCV
//! columns gets the same frame back, sorted by date, with the feature columns
//! appended as nullable `f64`. Columns the pipeline does not know about are
//! carried through untouched.

use std::fs::File;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use tracing::info;

use crate::data::{PriceBar, PriceSeries};
use crate::error::{FeatureError, Result};
use crate::features::{is_missing, FeaturePipeline, FeatureTable};

/// Base columns every input frame must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Accepted names for the date column, first match wins
pub const DATE_COLUMNS: [&str; 3] = ["date", "timestamp", "datetime"];

const ADJ_CLOSE_COLUMNS: [&str; 2] = ["adj_close", "adj close"];

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Name of the frame's date column
pub fn date_column_name(frame: &DataFrame) -> Result<&'static str> {
    DATE_COLUMNS
        .into_iter()
        .find(|name| frame.column(name).is_ok())
        .ok_or_else(|| FeatureError::MissingColumn(DATE_COLUMNS[0].to_string()))
}

fn date_values(frame: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    let column = frame
        .column(name)
        .map_err(|_| FeatureError::MissingColumn(name.to_string()))?;

    if column.dtype() == &DataType::String {
        return column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .and_then(|text| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok())
                    .ok_or(FeatureError::InvalidTimestamp { row })
            })
            .collect();
    }

    let days = column
        .cast(&DataType::Date)
        .and_then(|dates| dates.cast(&DataType::Int32))
        .map_err(|_| FeatureError::InvalidTimestamp { row: 0 })?;
    days.i32()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(|d| epoch() + Duration::days(i64::from(d)))
                .ok_or(FeatureError::InvalidTimestamp { row })
        })
        .collect()
}

fn float_values(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = frame
        .column(name)
        .map_err(|_| FeatureError::MissingColumn(name.to_string()))?;
    let non_numeric = |row| FeatureError::NonNumeric {
        column: name.to_string(),
        row,
    };
    // non-strict cast: unparsable cells become nulls and are reported below
    let casted = column.cast(&DataType::Float64)?;
    casted
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| non_numeric(row)))
        .collect()
}

/// Read the base columns of a frame into a [`PriceSeries`], in frame order.
pub fn series_from_frame(frame: &DataFrame) -> Result<PriceSeries> {
    let dates = date_values(frame, date_column_name(frame)?)?;
    let [open, high, low, close, volume] = [
        float_values(frame, REQUIRED_COLUMNS[0])?,
        float_values(frame, REQUIRED_COLUMNS[1])?,
        float_values(frame, REQUIRED_COLUMNS[2])?,
        float_values(frame, REQUIRED_COLUMNS[3])?,
        float_values(frame, REQUIRED_COLUMNS[4])?,
    ];
    let adj_close = ADJ_CLOSE_COLUMNS
        .into_iter()
        .find(|name| frame.column(name).is_ok())
        .map(|name| -> Result<Vec<Option<f64>>> {
            let column = frame.column(name)?.cast(&DataType::Float64)?;
            Ok(column.f64()?.into_iter().collect())
        })
        .transpose()?;

    Ok((0..frame.height())
        .map(|i| {
            let bar = PriceBar::new(dates[i], open[i], high[i], low[i], close[i], volume[i]);
            match adj_close.as_ref().and_then(|values| values[i]) {
                Some(adj) => bar.with_adj_close(adj),
                None => bar,
            }
        })
        .collect())
}

/// Sort a frame by its date column, keeping the order of equal dates
pub fn sort_frame(frame: &DataFrame) -> Result<DataFrame> {
    let dates = date_values(frame, date_column_name(frame)?)?;
    let mut order: Vec<IdxSize> = (0..dates.len() as IdxSize).collect();
    order.sort_by_key(|&i| dates[i as usize]);
    let idx = IdxCa::from_vec("idx".into(), order);
    Ok(frame.take(&idx)?)
}

fn feature_series(name: &str, values: &[f64]) -> Series {
    let values: Vec<Option<f64>> = values
        .iter()
        .map(|&v| if is_missing(v) { None } else { Some(v) })
        .collect();
    Series::new(name.into(), values)
}

/// Compute features for a frame and append them to it.
///
/// The result is the input sorted by date with one extra column per feature.
/// A feature name already present in the input is replaced.
pub fn features_frame(frame: &DataFrame, pipeline: &FeaturePipeline) -> Result<DataFrame> {
    let mut sorted = sort_frame(frame)?;
    let table = pipeline.run(series_from_frame(&sorted)?)?;
    for column in table.columns() {
        sorted.with_column(feature_series(&column.name, &column.values))?;
    }
    Ok(sorted)
}

/// Keep only rows where every named column is non-null
pub fn drop_missing_rows(frame: &DataFrame, names: &[String]) -> Result<DataFrame> {
    let mut mask = BooleanChunked::full("mask".into(), true, frame.height());
    for name in names {
        let present = frame
            .column(name)
            .map_err(|_| FeatureError::MissingColumn(name.clone()))?
            .is_not_null();
        mask = &mask & &present;
    }
    Ok(frame.filter(&mask)?)
}

impl FeatureTable {
    /// Base columns plus every feature as a new frame
    pub fn to_frame(&self) -> Result<DataFrame> {
        let series = self.series();
        let dates: Vec<String> = series
            .timestamps()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();

        let mut columns: Vec<Column> = vec![
            Column::new("date".into(), dates),
            Column::new("open".into(), series.open()),
            Column::new("high".into(), series.high()),
            Column::new("low".into(), series.low()),
            Column::new("close".into(), series.close()),
            Column::new("volume".into(), series.volume()),
        ];
        if series.iter().any(|bar| bar.adj_close.is_some()) {
            let adj: Vec<Option<f64>> = series.iter().map(|bar| bar.adj_close).collect();
            columns.push(Column::new("adj_close".into(), adj));
        }
        for column in self.columns() {
            columns.push(feature_series(&column.name, &column.values).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Read a CSV file with a header row
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    info!(path = %path.display(), rows = frame.height(), "loaded csv");
    Ok(frame)
}

/// Write a frame as CSV with a header row; nulls are written as empty cells
pub fn write_csv(path: impl AsRef<Path>, frame: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file).include_header(true).finish(frame)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df!(
            "date" => ["2020-01-03", "2020-01-01", "2020-01-02"],
            "open" => [102.0, 100.0, 101.0],
            "high" => [103.0, 101.0, 102.0],
            "low" => [101.0, 99.0, 100.0],
            "close" => [102.0, 100.0, 101.0],
            "volume" => [10i64, 20, 30],
            "symbol" => ["SPY", "SPY", "SPY"],
        )
        .unwrap()
    }

    #[test]
    fn test_series_from_frame() {
        let series = series_from_frame(&sample_frame()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.close(), vec![102.0, 100.0, 101.0]);
        assert_eq!(series.volume(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_sort_frame() {
        let sorted = sort_frame(&sample_frame()).unwrap();
        let closes: Vec<f64> = sorted.column("close").unwrap().f64().unwrap().into_no_null_iter().collect();
        assert_eq!(closes, vec![100.0, 101.0, 102.0]);
    }

    #[test]
    fn test_missing_column() {
        let frame = sample_frame().drop("high").unwrap();
        assert!(matches!(
            series_from_frame(&frame),
            Err(FeatureError::MissingColumn(name)) if name == "high"
        ));
    }

    #[test]
    fn test_missing_date_column() {
        let frame = sample_frame().drop("date").unwrap();
        assert!(matches!(
            series_from_frame(&frame),
            Err(FeatureError::MissingColumn(name)) if name == "date"
        ));
    }

    #[test]
    fn test_non_numeric_column() {
        let mut frame = sample_frame();
        frame
            .with_column(Series::new("close".into(), ["a", "b", "c"]))
            .unwrap();
        assert!(matches!(
            series_from_frame(&frame),
            Err(FeatureError::NonNumeric { column, .. }) if column == "close"
        ));
    }

    #[test]
    fn test_bad_date() {
        let mut frame = sample_frame();
        frame
            .with_column(Series::new("date".into(), ["2020-01-03", "nope", "2020-01-02"]))
            .unwrap();
        assert!(matches!(
            series_from_frame(&frame),
            Err(FeatureError::InvalidTimestamp { row: 1 })
        ));
    }

    #[test]
    fn test_features_frame_passes_extra_columns() {
        let out = features_frame(&sample_frame(), &FeaturePipeline::default()).unwrap();
        assert_eq!(out.height(), 3);
        assert!(out.column("symbol").is_ok());
        let ret1 = out.column("ret1").unwrap().f64().unwrap();
        assert_eq!(ret1.null_count(), 1);
        assert!(ret1.get(0).is_none());
        assert!((ret1.get(1).unwrap() - 0.01).abs() < 1e-12);
        assert_eq!(out.width(), 7 + 15);
    }

    #[test]
    fn test_drop_missing_rows_keeps_extra_columns() {
        let mut frame = df!(
            "date" => ["2020-01-01", "2020-01-02", "2020-01-03"],
            "symbol" => ["SPY", "SPY", "SPY"],
        )
        .unwrap();
        frame
            .with_column(Series::new("ret1".into(), [None, Some(0.1), Some(0.2)]))
            .unwrap();
        let kept = drop_missing_rows(&frame, &["ret1".to_string()]).unwrap();
        assert_eq!(kept.height(), 2);
        assert!(kept.column("symbol").is_ok());

        assert!(matches!(
            drop_missing_rows(&frame, &["ret5".to_string()]),
            Err(FeatureError::MissingColumn(name)) if name == "ret5"
        ));
    }

    #[test]
    fn test_to_frame() {
        let series = series_from_frame(&sample_frame()).unwrap();
        let table = FeaturePipeline::default().run(series).unwrap();
        let frame = table.to_frame().unwrap();
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.width(), 6 + 15);
        assert_eq!(frame.column("atr_14").unwrap().null_count(), 3);
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        let mut frame = sample_frame();
        write_csv(&path, &mut frame).unwrap();
        let loaded = read_csv(&path).unwrap();
        let series = series_from_frame(&loaded).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.timestamps()[0], NaiveDate::from_ymd_opt(2020, 1, 3).unwrap());
    }
}
