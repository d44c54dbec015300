//! Static strategy catalog
//!
//! Describes each strategy's id, display name and tunable parameters with
//! their bounds. The catalog drives parameter pickers and default values; the
//! engines never consult it and never clamp out-of-range values.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BacktestError;

/// Key shared by every strategy for the starting cash amount
pub const INITIAL_CAPITAL_KEY: &str = "initialCapital";

/// Strategy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyId {
    SmaCrossover,
    Rsi,
    Macd,
    Bollinger,
    MeanReversion,
}

impl StrategyId {
    pub const ALL: [StrategyId; 5] = [
        StrategyId::SmaCrossover,
        StrategyId::Rsi,
        StrategyId::Macd,
        StrategyId::Bollinger,
        StrategyId::MeanReversion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::SmaCrossover => "sma-crossover",
            StrategyId::Rsi => "rsi",
            StrategyId::Macd => "macd",
            StrategyId::Bollinger => "bollinger",
            StrategyId::MeanReversion => "mean-reversion",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find(s)
            .map(|def| def.id)
            .ok_or_else(|| BacktestError::UnknownStrategy(s.to_string()))
    }
}

/// One tunable parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParameterSpec {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Catalog entry for one strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyDefinition {
    pub id: StrategyId,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ParameterSpec],
}

impl StrategyDefinition {
    pub fn parameter(&self, key: &str) -> Option<&'static ParameterSpec> {
        self.parameters.iter().find(|p| p.key == key)
    }

    /// Parameter map seeded with every default value
    pub fn default_values(&self) -> HashMap<String, f64> {
        self.parameters
            .iter()
            .map(|p| (p.key.to_string(), p.default))
            .collect()
    }
}

/// A supplied value that falls outside its catalog bounds
#[derive(Debug, Clone, PartialEq)]
pub struct BoundViolation {
    pub key: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for BoundViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside [{}, {}]",
            self.key, self.value, self.min, self.max
        )
    }
}

const INITIAL_CAPITAL: ParameterSpec = ParameterSpec {
    key: INITIAL_CAPITAL_KEY,
    label: "Initial Capital ($)",
    default: 10000.0,
    min: 1000.0,
    max: 1_000_000.0,
    step: 1000.0,
};

static STRATEGIES: [StrategyDefinition; 5] = [
    StrategyDefinition {
        id: StrategyId::SmaCrossover,
        name: "SMA Crossover",
        description: "Buys when short-term SMA crosses above long-term SMA and sells when it crosses below.",
        parameters: &[
            ParameterSpec {
                key: "shortPeriod",
                label: "Short Period",
                default: 10.0,
                min: 2.0,
                max: 50.0,
                step: 1.0,
            },
            ParameterSpec {
                key: "longPeriod",
                label: "Long Period",
                default: 30.0,
                min: 5.0,
                max: 200.0,
                step: 1.0,
            },
            INITIAL_CAPITAL,
        ],
    },
    StrategyDefinition {
        id: StrategyId::Rsi,
        name: "RSI Strategy",
        description: "Buys when RSI exits oversold territory and sells when it exits overbought territory.",
        parameters: &[
            ParameterSpec {
                key: "period",
                label: "RSI Period",
                default: 14.0,
                min: 2.0,
                max: 50.0,
                step: 1.0,
            },
            ParameterSpec {
                key: "overbought",
                label: "Overbought Level",
                default: 70.0,
                min: 50.0,
                max: 90.0,
                step: 1.0,
            },
            ParameterSpec {
                key: "oversold",
                label: "Oversold Level",
                default: 30.0,
                min: 10.0,
                max: 50.0,
                step: 1.0,
            },
            INITIAL_CAPITAL,
        ],
    },
    StrategyDefinition {
        id: StrategyId::Macd,
        name: "MACD Strategy",
        description: "Buys when MACD line crosses above signal line and sells when it crosses below.",
        parameters: &[
            ParameterSpec {
                key: "fastPeriod",
                label: "Fast EMA Period",
                default: 12.0,
                min: 2.0,
                max: 50.0,
                step: 1.0,
            },
            ParameterSpec {
                key: "slowPeriod",
                label: "Slow EMA Period",
                default: 26.0,
                min: 5.0,
                max: 100.0,
                step: 1.0,
            },
            ParameterSpec {
                key: "signalPeriod",
                label: "Signal Period",
                default: 9.0,
                min: 2.0,
                max: 50.0,
                step: 1.0,
            },
            INITIAL_CAPITAL,
        ],
    },
    StrategyDefinition {
        id: StrategyId::Bollinger,
        name: "Bollinger Bands",
        description: "Buys when price touches lower band and sells when it touches upper band.",
        parameters: &[
            ParameterSpec {
                key: "period",
                label: "SMA Period",
                default: 20.0,
                min: 5.0,
                max: 100.0,
                step: 1.0,
            },
            ParameterSpec {
                key: "stdDev",
                label: "Standard Deviation Multiplier",
                default: 2.0,
                min: 0.5,
                max: 5.0,
                step: 0.1,
            },
            INITIAL_CAPITAL,
        ],
    },
    StrategyDefinition {
        id: StrategyId::MeanReversion,
        name: "Mean Reversion",
        description: "Buys when price is significantly below mean and sells when it returns to the mean.",
        parameters: &[
            ParameterSpec {
                key: "lookbackPeriod",
                label: "Lookback Period",
                default: 20.0,
                min: 5.0,
                max: 100.0,
                step: 1.0,
            },
            ParameterSpec {
                key: "entryThreshold",
                label: "Entry Threshold (stdDev)",
                default: 1.5,
                min: 0.5,
                max: 5.0,
                step: 0.1,
            },
            ParameterSpec {
                key: "exitThreshold",
                label: "Exit Threshold (stdDev)",
                default: 0.5,
                min: 0.0,
                max: 3.0,
                step: 0.1,
            },
            INITIAL_CAPITAL,
        ],
    },
];

/// All strategies, in picker order
pub fn definitions() -> &'static [StrategyDefinition] {
    &STRATEGIES
}

pub fn definition(id: StrategyId) -> &'static StrategyDefinition {
    match id {
        StrategyId::SmaCrossover => &STRATEGIES[0],
        StrategyId::Rsi => &STRATEGIES[1],
        StrategyId::Macd => &STRATEGIES[2],
        StrategyId::Bollinger => &STRATEGIES[3],
        StrategyId::MeanReversion => &STRATEGIES[4],
    }
}

/// Look up a strategy by its string id
pub fn find(id: &str) -> Option<&'static StrategyDefinition> {
    STRATEGIES.iter().find(|d| d.id.as_str() == id)
}

/// Report every supplied value outside its catalog bounds
///
/// Keys the strategy does not declare are skipped here.
pub fn check_bounds(id: StrategyId, values: &HashMap<String, f64>) -> Vec<BoundViolation> {
    let def = definition(id);
    let mut violations: Vec<BoundViolation> = values
        .iter()
        .filter_map(|(key, &value)| {
            let spec = def.parameter(key)?;
            (!spec.contains(value)).then(|| BoundViolation {
                key: key.clone(),
                value,
                min: spec.min,
                max: spec.max,
            })
        })
        .collect();
    violations.sort_by(|a, b| a.key.cmp(&b.key));
    violations
}
