/// Bollinger Bands result
///
/// Every band is index-aligned with the input prices; positions before
/// `period - 1` are `None`.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands
///
/// # Arguments
/// * `prices` - Slice of closing prices
/// * `period` - Period for moving average (typically 20)
/// * `std_dev` - Number of standard deviations (typically 2.0)
///
/// # Returns
/// BollingerBands struct containing upper, middle (SMA), and lower bands.
/// The deviation is the population standard deviation of the same window.
pub fn calculate_bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let n = prices.len();
    let mut bb = BollingerBands {
        upper: vec![None; n],
        middle: vec![None; n],
        lower: vec![None; n],
    };

    if n < period || period == 0 {
        return bb;
    }

    for i in (period - 1)..n {
        let sum: f64 = (0..period).map(|j| prices[i - j]).sum();
        let mean = sum / period as f64;

        let squared: f64 = (0..period).map(|j| (prices[i - j] - mean).powi(2)).sum();
        let std = (squared / period as f64).sqrt();

        bb.middle[i] = Some(mean);
        bb.upper[i] = Some(mean + std_dev * std);
        bb.lower[i] = Some(mean - std_dev * std);
    }

    bb
}
