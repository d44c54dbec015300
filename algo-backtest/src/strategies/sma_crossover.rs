use common::SmaCrossoverParams;

use super::{crossed_above, crossed_below, Signal, SignalGenerator};
use crate::indicators::TrimmedSeries;

/// Short/long simple moving average crossover
///
/// A bar where either SMA is not yet defined yields no signal.
pub struct SmaCrossoverSignals {
    params: SmaCrossoverParams,
    short: TrimmedSeries,
    long: TrimmedSeries,
}

impl SmaCrossoverSignals {
    pub fn new(closes: &[f64], params: SmaCrossoverParams) -> Self {
        Self {
            params,
            short: TrimmedSeries::sma(closes, params.short_period),
            long: TrimmedSeries::sma(closes, params.long_period),
        }
    }
}

impl SignalGenerator for SmaCrossoverSignals {
    fn name(&self) -> &'static str {
        "sma-crossover"
    }

    fn start_index(&self) -> usize {
        self.params.long_period
    }

    fn on_bar(&mut self, index: usize, _price: f64, in_position: bool) -> Option<Signal> {
        let prev = index.checked_sub(1)?;
        let prev_short = self.short.at(prev)?;
        let prev_long = self.long.at(prev)?;
        let short = self.short.at(index)?;
        let long = self.long.at(index)?;

        if !in_position && crossed_above(prev_short, prev_long, short, long) {
            Some(Signal::buy(format!(
                "SMA({}) {:.2} crossed above SMA({}) {:.2}",
                self.params.short_period, short, self.params.long_period, long
            )))
        } else if in_position && crossed_below(prev_short, prev_long, short, long) {
            Some(Signal::sell(format!(
                "SMA({}) {:.2} crossed below SMA({}) {:.2}",
                self.params.short_period, short, self.params.long_period, long
            )))
        } else {
            None
        }
    }
}
