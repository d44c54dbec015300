use common::MeanReversionParams;

use super::{Signal, SignalGenerator};

/// Z-score mean reversion
///
/// The mean and population standard deviation are taken over the
/// `lookback_period` bars before the current one. A flat window gives a zero
/// deviation and the z-score follows IEEE division: NaN when the price sits
/// on the mean, which never trades, and an infinity otherwise.
pub struct MeanReversionSignals {
    params: MeanReversionParams,
    closes: Vec<f64>,
}

impl MeanReversionSignals {
    pub fn new(closes: &[f64], params: MeanReversionParams) -> Self {
        Self {
            params,
            closes: closes.to_vec(),
        }
    }

    /// Z-score of `price` against the window ending just before `index`
    ///
    /// `None` when the window does not fit inside the close series.
    fn z_score(&self, index: usize, price: f64) -> Option<f64> {
        let lookback = self.params.lookback_period;
        let start = index.checked_sub(lookback)?;
        let window = self.closes.get(start..index)?;

        // newest first
        let sum: f64 = window.iter().rev().sum();
        let mean = sum / lookback as f64;
        let squared: f64 = window.iter().rev().map(|c| (c - mean).powi(2)).sum();
        let std_dev = (squared / lookback as f64).sqrt();

        Some((price - mean) / std_dev)
    }
}

impl SignalGenerator for MeanReversionSignals {
    fn name(&self) -> &'static str {
        "mean-reversion"
    }

    fn start_index(&self) -> usize {
        self.params.lookback_period
    }

    fn on_bar(&mut self, index: usize, price: f64, in_position: bool) -> Option<Signal> {
        let z = self.z_score(index, price)?;

        if !in_position && z < -self.params.entry_threshold {
            Some(Signal::buy(format!(
                "z-score {:.2} below -{:.2}",
                z, self.params.entry_threshold
            )))
        } else if in_position && z > -self.params.exit_threshold {
            Some(Signal::sell(format!(
                "z-score {:.2} above -{:.2}",
                z, self.params.exit_threshold
            )))
        } else {
            None
        }
    }
}
