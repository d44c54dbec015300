//! Entry/exit rules for each catalog strategy
//!
//! Every strategy precomputes its indicators over the whole close series
//! and is then stepped bar by bar by [`crate::engine::BacktestEngine`].

pub mod bollinger;
pub mod macd;
pub mod mean_reversion;
pub mod rsi;
pub mod sma_crossover;

pub use bollinger::BollingerSignals;
pub use macd::MacdSignals;
pub use mean_reversion::MeanReversionSignals;
pub use rsi::RsiSignals;
pub use sma_crossover::SmaCrossoverSignals;

use common::{StrategyParams, TradeType};

/// Trading signal
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub trade_type: TradeType,
    pub reason: String,
}

impl Signal {
    pub fn buy(reason: impl Into<String>) -> Self {
        Self {
            trade_type: TradeType::Buy,
            reason: reason.into(),
        }
    }

    pub fn sell(reason: impl Into<String>) -> Self {
        Self {
            trade_type: TradeType::Sell,
            reason: reason.into(),
        }
    }
}

/// Bar-by-bar signal source for one strategy
pub trait SignalGenerator {
    fn name(&self) -> &'static str;

    /// First bar index the engine evaluates
    fn start_index(&self) -> usize;

    /// Evaluate bar `index`.
    ///
    /// Only returns a buy while flat and a sell while in position; the engine
    /// fills every signal it receives.
    fn on_bar(&mut self, index: usize, price: f64, in_position: bool) -> Option<Signal>;
}

/// Build the signal generator for `params` over `closes`
pub fn build(params: &StrategyParams, closes: &[f64]) -> Box<dyn SignalGenerator> {
    match *params {
        StrategyParams::SmaCrossover(p) => Box::new(SmaCrossoverSignals::new(closes, p)),
        StrategyParams::Rsi(p) => Box::new(RsiSignals::new(closes, p)),
        StrategyParams::Macd(p) => Box::new(MacdSignals::new(closes, p)),
        StrategyParams::Bollinger(p) => Box::new(BollingerSignals::new(closes, p)),
        StrategyParams::MeanReversion(p) => Box::new(MeanReversionSignals::new(closes, p)),
    }
}

/// `a` moved from at-or-below `b` to strictly above it
pub(crate) fn crossed_above(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a <= prev_b && a > b
}

/// `a` moved from at-or-above `b` to strictly below it
pub(crate) fn crossed_below(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a >= prev_b && a < b
}
