use common::BollingerParams;

use super::{Signal, SignalGenerator};
use crate::indicators::{calculate_bollinger_bands, BollingerBands};

/// Buy at the lower band, sell at the upper band
pub struct BollingerSignals {
    params: BollingerParams,
    bands: BollingerBands,
}

impl BollingerSignals {
    pub fn new(closes: &[f64], params: BollingerParams) -> Self {
        Self {
            params,
            bands: calculate_bollinger_bands(closes, params.period, params.std_dev),
        }
    }
}

impl SignalGenerator for BollingerSignals {
    fn name(&self) -> &'static str {
        "bollinger"
    }

    fn start_index(&self) -> usize {
        self.params.period
    }

    fn on_bar(&mut self, index: usize, price: f64, in_position: bool) -> Option<Signal> {
        let lower = self.bands.lower.get(index).copied().flatten();
        let upper = self.bands.upper.get(index).copied().flatten();

        match (lower, upper) {
            (Some(lower), _) if !in_position && price <= lower => Some(Signal::buy(format!(
                "price {:.2} at or below lower band {:.2}",
                price, lower
            ))),
            (_, Some(upper)) if in_position && price >= upper => Some(Signal::sell(format!(
                "price {:.2} at or above upper band {:.2}",
                price, upper
            ))),
            _ => None,
        }
    }
}
