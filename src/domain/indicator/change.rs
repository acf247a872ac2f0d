//! One-step percent change of a bar field.
//!
//! PCT_CHANGE[i] = (X[i] - X[i-1]) / X[i-1]
//! Invalid at i = 0. A zero previous value yields 0.0 rather than an infinity.

use crate::domain::indicator::{Field, IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

fn read(bar: &OhlcvBar, field: Field) -> f64 {
    match field {
        Field::Close => bar.close,
        Field::Volume => bar.volume as f64,
    }
}

pub fn calculate_pct_change(bars: &[OhlcvBar], field: Field) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            values.push(IndicatorPoint::warmup(bar.date));
            continue;
        }
        let prev = read(&bars[i - 1], field);
        let curr = read(bar, field);
        let change = if prev == 0.0 { 0.0 } else { (curr - prev) / prev };
        values.push(IndicatorPoint::valid(bar.date, change));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::PctChange(field),
        values,
    }
}
