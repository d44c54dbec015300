use serde::{Deserialize, Serialize};

/// One bar of a price series
///
/// Only the closing price is consumed by the strategies. `date` is an opaque
/// ordering key and is never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(alias = "Date")]
    pub date: String,
    #[serde(alias = "Close")]
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: impl Into<String>, close: f64) -> Self {
        Self {
            date: date.into(),
            close,
        }
    }
}

/// Trade side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

/// Individual fill recorded by a strategy engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub shares: u64,
}

impl Trade {
    /// Cash value of the fill
    pub fn value(&self) -> f64 {
        self.price * self.shares as f64
    }
}

/// Portfolio value (cash + marked position) at one bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: String,
    pub value: f64,
}

/// Backtest result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    /// Fraction in `0..=1`, not a percentage
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// Equity curve, seeded with the initial capital at the first bar's date
    pub returns: Vec<EquityPoint>,
}

impl BacktestResult {
    /// Result for a series too short to trade on
    pub fn degenerate(returns: Vec<EquityPoint>) -> Self {
        Self {
            trades: Vec::new(),
            profit_loss: 0.0,
            profit_loss_percent: 0.0,
            max_drawdown: 0.0,
            sharpe_ratio: 0.0,
            returns,
        }
    }

    pub fn final_capital(&self, initial_capital: f64) -> f64 {
        initial_capital + self.profit_loss
    }

    pub fn buy_count(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.trade_type == TradeType::Buy)
            .count()
    }

    pub fn sell_count(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.trade_type == TradeType::Sell)
            .count()
    }

    /// Pairs each buy with the sell that closed it
    pub fn round_trips(&self) -> Vec<(&Trade, &Trade)> {
        self.trades
            .chunks_exact(2)
            .map(|pair| (&pair[0], &pair[1]))
            .collect()
    }
}
