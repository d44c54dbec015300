//! Technical indicators over a close-price series
//!
//! Two alignment conventions are used and never mixed:
//! * trimmed (`Vec<f64>` shorter than the input): [`calculate_sma`], [`calculate_rsi`]
//! * index-aligned (same length as the input): [`calculate_ema`], [`calculate_macd`],
//!   and [`calculate_bollinger_bands`], which pads with `None`
//!
//! Strategies read trimmed series through [`TrimmedSeries`], which maps a bar
//! index back to the trimmed position.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{calculate_bollinger_bands, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, Macd};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

/// Bar-indexed view over a trimmed series
///
/// `values[0]` belongs to bar `offset`; bars before it, or past the end of
/// the series, have no value.
#[derive(Debug, Clone)]
pub struct TrimmedSeries {
    values: Vec<f64>,
    offset: usize,
}

impl TrimmedSeries {
    pub fn new(values: Vec<f64>, offset: usize) -> Self {
        Self { values, offset }
    }

    /// SMA view: the first value belongs to bar `period - 1`
    pub fn sma(prices: &[f64], period: usize) -> Self {
        Self::new(calculate_sma(prices, period), period.saturating_sub(1))
    }

    /// RSI view: the first value belongs to bar `max(period, 1)`
    pub fn rsi(prices: &[f64], period: usize) -> Self {
        Self::new(calculate_rsi(prices, period), period.max(1))
    }

    pub fn at(&self, bar: usize) -> Option<f64> {
        bar.checked_sub(self.offset)
            .and_then(|i| self.values.get(i))
            .copied()
    }
}
