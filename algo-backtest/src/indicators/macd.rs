use super::ema::calculate_ema;

/// MACD result, every series index-aligned with the input prices
#[derive(Debug, Clone)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Calculate MACD
///
/// # Arguments
/// * `prices` - Slice of closing prices
/// * `fast_period` - Fast EMA period (typically 12)
/// * `slow_period` - Slow EMA period (typically 26)
/// * `signal_period` - EMA period applied to the MACD line (typically 9)
pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Macd {
    let fast = calculate_ema(prices, fast_period);
    let slow = calculate_ema(prices, slow_period);

    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = calculate_ema(&macd, signal_period);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Macd {
        macd,
        signal,
        histogram,
    }
}
