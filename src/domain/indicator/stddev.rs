//! Rolling sample standard deviation of closing prices.
//!
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n - 1))
//! Warmup: first (n-1) bars are invalid. A period below 2 never becomes valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_stddev(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let warmup = period.saturating_sub(1);

    for (i, bar) in bars.iter().enumerate() {
        if period < 2 || i < warmup {
            values.push(IndicatorPoint::warmup(bar.date));
            continue;
        }

        let window = &bars[i + 1 - period..=i];
        let mean: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let variance: f64 = window
            .iter()
            .map(|b| {
                let diff = b.close - mean;
                diff * diff
            })
            .sum::<f64>()
            / (period - 1) as f64;

        values.push(IndicatorPoint::valid(bar.date, variance.sqrt()));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}
