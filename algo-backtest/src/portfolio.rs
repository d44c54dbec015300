use common::{Trade, TradeType};

/// Single-asset, long-only cash account
///
/// Holds at most one position at a time. Entries buy as many whole shares as
/// the cash allows; exits sell the full holding.
#[derive(Debug)]
pub struct Portfolio {
    initial_capital: f64,
    cash: f64,
    shares: u64,
    in_position: bool,
    trades: Vec<Trade>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            cash: initial_capital,
            shares: 0,
            in_position: false,
            trades: Vec::new(),
        }
    }

    /// Cash plus the holding marked at `price`
    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.shares as f64 * price
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn shares(&self) -> u64 {
        self.shares
    }

    pub fn in_position(&self) -> bool {
        self.in_position
    }

    /// Realized P&L; only meaningful once flat
    pub fn profit_loss(&self) -> f64 {
        self.cash - self.initial_capital
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    /// Enter with `floor(cash / price)` shares
    ///
    /// Returns `None` when a position is already open. A price above the
    /// available cash still opens the position and records a trade with
    /// zero shares; the matching sell then also carries zero shares.
    pub fn buy(&mut self, date: &str, price: f64) -> Option<&Trade> {
        if self.in_position {
            return None;
        }

        let shares = (self.cash / price).floor() as u64;
        self.cash -= shares as f64 * price;
        self.shares = shares;
        self.in_position = true;

        self.record(date, price, TradeType::Buy, shares)
    }

    /// Exit the whole holding at `price`
    ///
    /// Returns `None` when flat.
    pub fn sell(&mut self, date: &str, price: f64) -> Option<&Trade> {
        if !self.in_position {
            return None;
        }

        let shares = self.shares;
        self.cash += shares as f64 * price;
        self.shares = 0;
        self.in_position = false;

        self.record(date, price, TradeType::Sell, shares)
    }

    fn record(
        &mut self,
        date: &str,
        price: f64,
        trade_type: TradeType,
        shares: u64,
    ) -> Option<&Trade> {
        self.trades.push(Trade {
            date: date.to_string(),
            price,
            trade_type,
            shares,
        });
        self.trades.last()
    }
}
