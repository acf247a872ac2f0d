//! Shared helper functions for indicator calculations.

use std::collections::HashMap;

use crate::domain::indicator::change::calculate_pct_change;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate(bars: &[OhlcvBar], indicator: &IndicatorType) -> IndicatorSeries {
    match indicator {
        IndicatorType::Sma(period) => calculate_sma(bars, *period),
        IndicatorType::Stddev(period) => calculate_stddev(bars, *period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, *period),
        IndicatorType::PctChange(field) => calculate_pct_change(bars, *field),
    }
}

/// Computes each distinct indicator once.
pub fn compute_indicators(
    bars: &[OhlcvBar],
    indicators: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    let mut out = HashMap::with_capacity(indicators.len());
    for indicator in indicators {
        out.entry(indicator.clone())
            .or_insert_with(|| calculate(bars, indicator));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::Field;
    use chrono::NaiveDate;

    fn make_bars(count: usize) -> Vec<OhlcvBar> {
        (0..count)
            .map(|i| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + i as f64,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn computes_each_requested_indicator() {
        let bars = make_bars(25);
        let wanted = [
            IndicatorType::Sma(5),
            IndicatorType::Rsi(14),
            IndicatorType::PctChange(Field::Volume),
        ];
        let map = compute_indicators(&bars, &wanted);
        assert_eq!(map.len(), 3);
        for ind in &wanted {
            let series = &map[ind];
            assert_eq!(&series.indicator_type, ind);
            assert_eq!(series.values.len(), 25);
        }
    }

    #[test]
    fn duplicates_collapse() {
        let bars = make_bars(5);
        let map = compute_indicators(&bars, &[IndicatorType::Sma(2), IndicatorType::Sma(2)]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn dispatch_matches_direct_call() {
        let bars = make_bars(12);
        let via = calculate(&bars, &IndicatorType::Stddev(10));
        let direct = calculate_stddev(&bars, 10);
        assert_eq!(via.values, direct.values);
    }
}
