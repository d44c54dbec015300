use common::{BacktestResult, EquityPoint, Trade};

/// Periods per year used to annualize the Sharpe ratio.
///
/// Assumes daily bars; intraday or weekly series would need a different
/// constant.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Accumulates the equity curve and running drawdown of one backtest
#[derive(Debug)]
pub struct PerformanceTracker {
    initial_capital: f64,
    highest_value: f64,
    max_drawdown: f64,
    portfolio_values: Vec<f64>,
    returns: Vec<EquityPoint>,
}

impl PerformanceTracker {
    /// Seed the equity curve with the initial capital at `first_date`
    pub fn new(initial_capital: f64, first_date: &str) -> Self {
        Self {
            initial_capital,
            highest_value: initial_capital,
            max_drawdown: 0.0,
            portfolio_values: Vec::new(),
            returns: vec![EquityPoint {
                date: first_date.to_string(),
                value: initial_capital,
            }],
        }
    }

    /// Record the portfolio value at one processed bar
    pub fn record(&mut self, date: &str, value: f64) {
        self.portfolio_values.push(value);
        self.returns.push(EquityPoint {
            date: date.to_string(),
            value,
        });

        if value > self.highest_value {
            self.highest_value = value;
        }

        let drawdown = (self.highest_value - value) / self.highest_value;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
    }

    /// Reduce to the final result once the position is flat
    pub fn finish(self, trades: Vec<Trade>, final_capital: f64) -> BacktestResult {
        let profit_loss = final_capital - self.initial_capital;
        let profit_loss_percent = (profit_loss / self.initial_capital) * 100.0;
        let sharpe_ratio = sharpe_ratio(&self.portfolio_values);

        BacktestResult {
            trades,
            profit_loss,
            profit_loss_percent,
            max_drawdown: self.max_drawdown,
            sharpe_ratio,
            returns: self.returns,
        }
    }
}

/// Simple per-step returns `(v[i] - v[i-1]) / v[i-1]`
pub fn step_returns(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Annualized Sharpe ratio of a portfolio value series
///
/// Uses the population standard deviation of the step returns and no
/// risk-free rate. Zero when there are no returns or they never vary.
pub fn sharpe_ratio(values: &[f64]) -> f64 {
    let returns = step_returns(values);
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        0.0
    } else {
        (mean / std_dev) * TRADING_DAYS_PER_YEAR.sqrt()
    }
}

/// Fractional drawdown from the running peak at every equity point
pub fn drawdown_curve(returns: &[EquityPoint]) -> Vec<f64> {
    let Some(first) = returns.first() else {
        return vec![];
    };

    let mut peak = first.value;
    returns
        .iter()
        .map(|point| {
            if point.value > peak {
                peak = point.value;
            }
            if peak > 0.0 {
                (peak - point.value) / peak
            } else {
                0.0
            }
        })
        .collect()
}
