use crate::models::{Band, Candle};

/// Compute the high/low band across a candle window.
///
/// High is the max of candle highs, low the min of candle lows. Returns
/// `None` when no candles are available so the caller can skip the cycle.
pub fn detect_band(candles: &[Candle]) -> Option<Band> {
    if candles.is_empty() {
        return None;
    }

    let high = candles
        .iter()
        .map(|c| c.high)
        .fold(f64::MIN, f64::max);
    let low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);

    Some(Band { high, low })
}
