/// Calculate Simple Moving Average
///
/// # Arguments
/// * `prices` - Slice of prices
/// * `period` - SMA period
///
/// # Returns
/// Trimmed vector of length `prices.len() - period + 1`. Element `0` is the
/// mean of `prices[..period]`, i.e. it corresponds to input index
/// `period - 1`. Windows that are not full are dropped, not padded. Empty
/// when `period` is 0 or exceeds the input length.
pub fn calculate_sma(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    if n < period || period == 0 {
        return vec![];
    }

    (period - 1..n)
        .map(|i| {
            // newest first
            let sum: f64 = (0..period).map(|j| prices[i - j]).sum();
            sum / period as f64
        })
        .collect()
}
