/// Calculate RSI from simple average gain/loss
///
/// Each value averages the trailing `period` price changes without
/// smoothing. When the average loss is zero the RSI is 100.
///
/// # Arguments
/// * `prices` - Slice of closing prices
/// * `period` - RSI period (typically 14)
///
/// # Returns
/// Trimmed vector: element `0` is the RSI at input index `max(period, 1)`.
/// Leading positions without a full window are dropped, not padded.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    let first = period.max(1);
    if n <= first {
        return vec![];
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    (first..n)
        .map(|i| {
            let mut gains = 0.0;
            let mut losses = 0.0;

            for j in 0..period {
                let change = changes[i - j - 1];
                if change > 0.0 {
                    gains += change;
                } else {
                    losses += change.abs();
                }
            }

            let avg_gain = gains / period as f64;
            let avg_loss = losses / period as f64;

            if avg_loss == 0.0 {
                100.0
            } else {
                let rs = avg_gain / avg_loss;
                100.0 - 100.0 / (1.0 + rs)
            }
        })
        .collect()
}
