//! Simple moving average of closing prices.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i])
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Sma(period);
    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: bars.iter().map(|b| IndicatorPoint::warmup(b.date)).collect(),
        };
    }

    let warmup = period - 1;
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i < warmup {
                return IndicatorPoint::warmup(bar.date);
            }
            let window = &bars[i + 1 - period..=i];
            let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            IndicatorPoint::valid(bar.date, mean)
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
