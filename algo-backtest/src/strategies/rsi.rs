use common::RsiParams;

use super::{Signal, SignalGenerator};
use crate::indicators::TrimmedSeries;

/// RSI exit-from-extreme strategy
///
/// Buys once RSI climbs back above `oversold` after having touched it, and
/// sells once it falls back below `overbought` after having touched it. The
/// touch flags persist across bars until a trade consumes them.
pub struct RsiSignals {
    params: RsiParams,
    rsi: TrimmedSeries,
    was_oversold: bool,
    was_overbought: bool,
}

impl RsiSignals {
    pub fn new(closes: &[f64], params: RsiParams) -> Self {
        Self {
            params,
            rsi: TrimmedSeries::rsi(closes, params.period),
            was_oversold: false,
            was_overbought: false,
        }
    }
}

impl SignalGenerator for RsiSignals {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn start_index(&self) -> usize {
        self.params.period + 1
    }

    fn on_bar(&mut self, index: usize, _price: f64, in_position: bool) -> Option<Signal> {
        let prev = index.checked_sub(1).and_then(|i| self.rsi.at(i));
        if let Some(prev) = prev {
            if prev <= self.params.oversold {
                self.was_oversold = true;
            }
            if prev >= self.params.overbought {
                self.was_overbought = true;
            }
        }

        let rsi = self.rsi.at(index)?;

        if !in_position && self.was_oversold && rsi > self.params.oversold {
            self.was_oversold = false;
            Some(Signal::buy(format!(
                "RSI({:.1}) recovered above {:.0}",
                rsi, self.params.oversold
            )))
        } else if in_position && self.was_overbought && rsi < self.params.overbought {
            self.was_overbought = false;
            Some(Signal::sell(format!(
                "RSI({:.1}) fell back below {:.0}",
                rsi, self.params.overbought
            )))
        } else {
            None
        }
    }
}
