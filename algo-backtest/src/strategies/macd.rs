use common::MacdParams;

use super::{crossed_above, crossed_below, Signal, SignalGenerator};
use crate::indicators::{calculate_macd, Macd};

/// MACD / signal line crossover
pub struct MacdSignals {
    params: MacdParams,
    macd: Macd,
}

impl MacdSignals {
    pub fn new(closes: &[f64], params: MacdParams) -> Self {
        Self {
            params,
            macd: calculate_macd(
                closes,
                params.fast_period,
                params.slow_period,
                params.signal_period,
            ),
        }
    }
}

impl SignalGenerator for MacdSignals {
    fn name(&self) -> &'static str {
        "macd"
    }

    fn start_index(&self) -> usize {
        self.params.fast_period.max(self.params.slow_period) + self.params.signal_period
    }

    fn on_bar(&mut self, index: usize, _price: f64, in_position: bool) -> Option<Signal> {
        let prev = index.checked_sub(1)?;
        let prev_macd = *self.macd.macd.get(prev)?;
        let prev_signal = *self.macd.signal.get(prev)?;
        let macd = *self.macd.macd.get(index)?;
        let signal = *self.macd.signal.get(index)?;

        if !in_position && crossed_above(prev_macd, prev_signal, macd, signal) {
            Some(Signal::buy(format!(
                "MACD {:.4} crossed above signal {:.4}",
                macd, signal
            )))
        } else if in_position && crossed_below(prev_macd, prev_signal, macd, signal) {
            Some(Signal::sell(format!(
                "MACD {:.4} crossed below signal {:.4}",
                macd, signal
            )))
        } else {
            None
        }
    }
}
