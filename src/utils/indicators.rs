// src/utils/indicators.rs
use ta::indicators::RelativeStrengthIndex;
use ta::Next;

pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI of the last close in `closes` (oldest first), rounded to one decimal.
///
/// Returns [`NEUTRAL_RSI`] until there are more than `period` samples, or when
/// the series is flat.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() <= period {
        return NEUTRAL_RSI;
    }
    let Ok(mut indicator) = RelativeStrengthIndex::new(period) else {
        return NEUTRAL_RSI;
    };

    let mut last = NEUTRAL_RSI;
    for close in closes {
        last = indicator.next(*close);
    }

    if last.is_finite() {
        ((last * 10.0).round() / 10.0).clamp(0.0, 100.0)
    } else {
        NEUTRAL_RSI
    }
}
