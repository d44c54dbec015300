pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::{StrategyDefinition, StrategyId};
pub use config::{
    BacktestParameters, BollingerParams, MacdParams, MeanReversionParams, RsiParams,
    SmaCrossoverParams, StrategyParams,
};
pub use error::{BacktestError, Result};
pub use types::*;
