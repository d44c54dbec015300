pub mod data;
pub mod engine;
pub mod indicators;
pub mod metrics;
pub mod portfolio;
pub mod strategies;

pub use data::{bars_from_closes, generate_synthetic_bars, load_file};
pub use engine::{compare_strategies, run_backtest, BacktestEngine};
pub use metrics::{drawdown_curve, sharpe_ratio, PerformanceTracker};
pub use portfolio::Portfolio;
pub use strategies::{Signal, SignalGenerator};

// Re-export common types
pub use common::{
    BacktestError, BacktestParameters, BacktestResult, BollingerParams, EquityPoint, MacdParams,
    MeanReversionParams, PriceBar, Result, RsiParams, SmaCrossoverParams, StrategyDefinition,
    StrategyId, StrategyParams, Trade, TradeType,
};
