use approx::assert_abs_diff_eq;
use chrono::{Duration, NaiveDate};

use signal_features::{
    is_missing, FeatureError, FeaturePipeline, FeatureSettings, FeatureTable, PriceBar,
    PriceSeries,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn from_closes(closes: &[f64]) -> PriceSeries {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            PriceBar::new(
                start() + Duration::days(i as i64),
                close,
                close + 1.0,
                close - 1.0,
                close,
                1_000.0,
            )
        })
        .collect()
}

/// A wandering but strictly positive series with gaps between some bars
fn wandering(len: usize) -> PriceSeries {
    let mut close = 250.0;
    (0..len)
        .map(|i| {
            let step = ((i * 7919) % 23) as f64 / 23.0 - 0.48;
            let open = close;
            close = (close * (1.0 + step * 0.03)).max(1.0);
            let high = open.max(close) * 1.004;
            let low = open.min(close) * 0.995;
            let gap = if i % 5 == 4 { 1 } else { 0 };
            PriceBar::new(
                start() + Duration::days((i * 3 + gap) as i64),
                open,
                high,
                low,
                close,
                1e6 + i as f64,
            )
        })
        .collect()
}

fn sequential(settings: FeatureSettings) -> FeaturePipeline {
    FeaturePipeline::new(FeatureSettings {
        parallel: false,
        ..settings
    })
    .unwrap()
}

fn missing(table: &FeatureTable, name: &str) -> usize {
    table.missing_count(name).unwrap()
}

#[test]
fn sma_scenario_matches_hand_computation() {
    let pipeline = sequential(FeatureSettings {
        sma_fast: 3,
        sma_mid: 5,
        sma_slow: 7,
        ..FeatureSettings::default()
    });
    let table = pipeline
        .run(from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]))
        .unwrap();

    let sma_3 = table.column("sma_3").unwrap();
    assert_eq!(missing(&table, "sma_3"), 2);
    assert_eq!(&sma_3[2..], &[20.0, 30.0, 40.0, 50.0, 60.0]);

    let sma_5 = table.column("sma_5").unwrap();
    assert_eq!(missing(&table, "sma_5"), 4);
    assert_eq!(&sma_5[4..], &[30.0, 40.0, 50.0]);

    let sma_7 = table.column("sma_7").unwrap();
    assert_eq!(missing(&table, "sma_7"), 6);
    assert_eq!(sma_7[6], 40.0);

    assert_eq!(missing(&table, "sma_3_slope"), 3);
    assert_eq!(missing(&table, "sma_5_slope"), 5);
    assert_eq!(missing(&table, "sma_7_slope"), 7);
    assert_eq!(table.column("sma_5_slope").unwrap()[5], 10.0);
}

#[test]
fn ret1_scenario() {
    let table = FeaturePipeline::default()
        .run(from_closes(&[100.0, 110.0, 121.0]))
        .unwrap();
    let ret1 = table.column("ret1").unwrap();
    assert!(is_missing(ret1[0]));
    assert_abs_diff_eq!(ret1[1], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(ret1[2], 0.1, epsilon = 1e-12);
}

#[test]
fn volatility_scenario_missing_counts() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + 10.0 * i as f64 / 29.0).collect();
    let table = FeaturePipeline::default().run(from_closes(&closes)).unwrap();
    assert_eq!(missing(&table, "volatility_10"), 9);
    assert_eq!(missing(&table, "tr"), 0);
    assert_eq!(missing(&table, "atr_14"), 13);
    assert_eq!(missing(&table, "atr_14_norm"), 13);
}

#[test]
fn missing_boundaries_follow_window_sizes() {
    let series = wandering(120);
    for window in [1usize, 2, 7, 33] {
        let pipeline = sequential(FeatureSettings {
            sma_fast: window,
            sma_mid: window + 100,
            sma_slow: window + 200,
            ..FeatureSettings::default()
        });
        let table = pipeline.run(series.clone()).unwrap();
        let sma = table.column(&format!("sma_{window}")).unwrap();
        for (i, value) in sma.iter().enumerate() {
            assert_eq!(is_missing(*value), i + 1 < window, "sma_{window} row {i}");
        }
    }

    let table = FeaturePipeline::default().run(series).unwrap();
    for k in [1usize, 5, 10] {
        let ret = table.column(&format!("ret{k}")).unwrap();
        for (i, value) in ret.iter().enumerate() {
            assert_eq!(is_missing(*value), i < k, "ret{k} row {i}");
        }
    }
    let z = table.column("ret_z20").unwrap();
    assert!(z[..20].iter().all(|v| is_missing(*v)));
    assert!(z[20..].iter().all(|v| !is_missing(*v)));
}

#[test]
fn constant_prices_are_idempotent() {
    let table = FeaturePipeline::default().run(from_closes(&[42.0; 30])).unwrap();
    for name in ["ret1", "ret5", "ret10"] {
        let values = table.column(name).unwrap();
        assert!(values.iter().filter(|v| !is_missing(**v)).all(|v| *v == 0.0));
    }
    assert_eq!(missing(&table, "ret_z20"), 30);
    assert!(!table.has_infinite());
}

#[test]
fn true_range_never_below_intraday_range() {
    let series = wandering(200);
    let table = FeaturePipeline::default().run(series.clone()).unwrap();
    let tr = table.column("tr").unwrap();
    for (bar, value) in series.iter().zip(tr) {
        assert!(*value >= (bar.high - bar.low).abs());
    }
}

#[test]
fn no_infinities_for_positive_prices() {
    let table = FeaturePipeline::default().run(wandering(300)).unwrap();
    assert!(!table.has_infinite());
}

#[test]
fn zero_close_becomes_missing_not_infinite() {
    let mut closes = vec![5.0; 40];
    closes[25] = 0.0;
    let series: PriceSeries = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(start() + Duration::days(i as i64), c, 6.0, 0.0, c, 0.0))
        .collect();
    let table = FeaturePipeline::default().run(series).unwrap();
    assert!(!table.has_infinite());
    assert!(is_missing(table.column("ret1").unwrap()[26]));
    assert!(is_missing(table.column("atr_14_norm").unwrap()[25]));
}

#[test]
fn no_look_ahead() {
    let series = wandering(90);
    let pipeline = FeaturePipeline::default();
    let full = pipeline.run(series.clone()).unwrap();

    for end in [1usize, 2, 14, 15, 21, 50, 51, 89] {
        let truncated = pipeline.run(series.prefix(end)).unwrap();
        let row = end - 1;
        for column in full.columns() {
            let expected = column.values[row];
            let actual = truncated.column(&column.name).unwrap()[row];
            if is_missing(expected) {
                assert!(is_missing(actual), "{} row {row}", column.name);
            } else {
                assert_eq!(expected.to_bits(), actual.to_bits(), "{} row {row}", column.name);
            }
        }
    }
}

#[test]
fn unsorted_input_is_normalized_first() {
    let sorted = wandering(40);
    let mut bars = sorted.clone().into_bars();
    bars.reverse();
    bars.swap(3, 17);

    let pipeline = FeaturePipeline::default();
    let a = pipeline.run(sorted).unwrap();
    let b = pipeline.run(PriceSeries::new(bars)).unwrap();
    assert_eq!(a.series(), b.series());
    assert_eq!(a.rows(), b.rows());
}

#[test]
fn caller_series_is_not_mutated() {
    let mut bars = wandering(30).into_bars();
    bars.reverse();
    let input = PriceSeries::new(bars);
    let snapshot = input.clone();
    let _ = FeaturePipeline::default().run(input.clone()).unwrap();
    assert_eq!(input, snapshot);
}

#[test]
fn duplicate_timestamps_fail_loudly() {
    let mut bars = wandering(10).into_bars();
    bars[6].timestamp = bars[5].timestamp;
    let result = FeaturePipeline::default().run(PriceSeries::new(bars));
    assert!(matches!(
        result,
        Err(FeatureError::DuplicateTimestamp { row: 6, .. })
    ));
}

#[test]
fn non_numeric_price_fails_loudly() {
    let mut bars = wandering(10).into_bars();
    bars[4].high = f64::INFINITY;
    let err = FeaturePipeline::default()
        .run(PriceSeries::new(bars))
        .unwrap_err();
    assert_eq!(err.to_string(), "column high holds a non-numeric value at row 4");
}

#[test]
fn output_columns_in_documented_order() {
    let table = FeaturePipeline::default().run(wandering(60)).unwrap();
    assert_eq!(
        table.feature_names(),
        vec![
            "ret1",
            "ret5",
            "ret10",
            "ret_z20",
            "sma_5",
            "sma_20",
            "sma_50",
            "sma_5_slope",
            "sma_20_slope",
            "sma_50_slope",
            "sma_20_distance",
            "volatility_10",
            "tr",
            "atr_14",
            "atr_14_norm",
        ]
    );
}

#[test]
fn drop_missing_keeps_only_complete_rows() {
    let table = FeaturePipeline::default().run(wandering(80)).unwrap();
    let trimmed = table.drop_missing();
    // sma_50_slope is the last column to fill, from row 50
    assert_eq!(trimmed.len(), 30);
    for column in trimmed.columns() {
        assert_eq!(column.missing_count(), 0, "{}", column.name);
    }
}

#[test]
fn huge_finite_prices_never_produce_infinities() {
    let table = FeaturePipeline::default()
        .run(from_closes(&[1.5e308; 30]))
        .unwrap();
    assert!(!table.has_infinite());
    for name in ["sma_5", "sma_20", "sma_5_slope", "sma_20_distance"] {
        assert_eq!(missing(&table, name), 30, "{name}");
    }
}

#[test]
fn equal_trend_windows_emit_one_column() {
    let pipeline = sequential(FeatureSettings {
        sma_fast: 20,
        sma_mid: 20,
        ..FeatureSettings::default()
    });
    let table = pipeline.run(wandering(60)).unwrap();
    let names = table.feature_names();
    assert_eq!(names.iter().filter(|n| **n == "sma_20").count(), 1);
    assert!(names.contains(&"sma_20_distance"));
    assert_eq!(missing(&table, "sma_20"), 19);
}
