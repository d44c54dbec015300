/// Calculate Exponential Moving Average
///
/// # Arguments
/// * `prices` - Slice of prices
/// * `period` - EMA period, smoothing constant `k = 2 / (period + 1)`
///
/// # Returns
/// Vector index-aligned with `prices`, seeded with `prices[0]`
pub fn calculate_ema(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    if n == 0 {
        return vec![];
    }

    let mut ema = vec![0.0; n];
    let k = 2.0 / (period as f64 + 1.0);

    // Initialize with first price
    ema[0] = prices[0];

    for i in 1..n {
        ema[i] = prices[i] * k + ema[i - 1] * (1.0 - k);
    }

    ema
}
