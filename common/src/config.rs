use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{definition, StrategyId, INITIAL_CAPITAL_KEY};
use crate::error::{BacktestError, Result};

/// SMA crossover parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmaCrossoverParams {
    pub short_period: usize,
    pub long_period: usize,
}

impl Default for SmaCrossoverParams {
    fn default() -> Self {
        Self {
            short_period: 10,
            long_period: 30,
        }
    }
}

/// RSI threshold-exit parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsiParams {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

/// MACD signal-line crossover parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// Bollinger band touch parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerParams {
    pub period: usize,
    pub std_dev: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

/// Z-score mean reversion parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeanReversionParams {
    pub lookback_period: usize,
    pub entry_threshold: f64,
    pub exit_threshold: f64,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            lookback_period: 20,
            entry_threshold: 1.5,
            exit_threshold: 0.5,
        }
    }
}

/// Parameters for one strategy, tagged by strategy id
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum StrategyParams {
    SmaCrossover(SmaCrossoverParams),
    Rsi(RsiParams),
    Macd(MacdParams),
    Bollinger(BollingerParams),
    MeanReversion(MeanReversionParams),
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams::SmaCrossover(SmaCrossoverParams::default())
    }
}

impl StrategyParams {
    pub fn id(&self) -> StrategyId {
        match self {
            StrategyParams::SmaCrossover(_) => StrategyId::SmaCrossover,
            StrategyParams::Rsi(_) => StrategyId::Rsi,
            StrategyParams::Macd(_) => StrategyId::Macd,
            StrategyParams::Bollinger(_) => StrategyId::Bollinger,
            StrategyParams::MeanReversion(_) => StrategyId::MeanReversion,
        }
    }

    pub fn defaults(id: StrategyId) -> Self {
        match id {
            StrategyId::SmaCrossover => StrategyParams::SmaCrossover(Default::default()),
            StrategyId::Rsi => StrategyParams::Rsi(Default::default()),
            StrategyId::Macd => StrategyParams::Macd(Default::default()),
            StrategyId::Bollinger => StrategyParams::Bollinger(Default::default()),
            StrategyId::MeanReversion => StrategyParams::MeanReversion(Default::default()),
        }
    }
}

/// Backtest parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestParameters {
    pub initial_capital: f64,
    pub strategy: StrategyParams,
}

impl Default for BacktestParameters {
    fn default() -> Self {
        Self {
            initial_capital: 10000.0,
            strategy: StrategyParams::default(),
        }
    }
}

impl BacktestParameters {
    pub fn new(strategy: StrategyParams) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.initial_capital = capital;
        self
    }

    /// Build typed parameters from a loose `{name: value}` map
    ///
    /// Missing keys take their catalog default. Keys the strategy does not
    /// declare are rejected. Values are not range-checked; see
    /// [`crate::catalog::check_bounds`] for advisory validation.
    pub fn from_values(id: StrategyId, values: &HashMap<String, f64>) -> Result<Self> {
        let def = definition(id);
        if let Some(unknown) = values.keys().find(|k| def.parameter(k).is_none()) {
            return Err(BacktestError::UnknownParameter {
                strategy: id.to_string(),
                name: unknown.clone(),
            });
        }

        let value = |key: &str| -> f64 {
            values
                .get(key)
                .copied()
                .or_else(|| def.parameter(key).map(|p| p.default))
                .unwrap_or(0.0)
        };
        let period = |key: &str| -> usize { value(key) as usize };

        let strategy = match id {
            StrategyId::SmaCrossover => StrategyParams::SmaCrossover(SmaCrossoverParams {
                short_period: period("shortPeriod"),
                long_period: period("longPeriod"),
            }),
            StrategyId::Rsi => StrategyParams::Rsi(RsiParams {
                period: period("period"),
                overbought: value("overbought"),
                oversold: value("oversold"),
            }),
            StrategyId::Macd => StrategyParams::Macd(MacdParams {
                fast_period: period("fastPeriod"),
                slow_period: period("slowPeriod"),
                signal_period: period("signalPeriod"),
            }),
            StrategyId::Bollinger => StrategyParams::Bollinger(BollingerParams {
                period: period("period"),
                std_dev: value("stdDev"),
            }),
            StrategyId::MeanReversion => StrategyParams::MeanReversion(MeanReversionParams {
                lookback_period: period("lookbackPeriod"),
                entry_threshold: value("entryThreshold"),
                exit_threshold: value("exitThreshold"),
            }),
        };

        Ok(Self {
            initial_capital: value(INITIAL_CAPITAL_KEY),
            strategy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::definitions;

    #[test]
    fn test_struct_defaults_match_catalog() {
        for def in definitions() {
            let from_catalog =
                BacktestParameters::from_values(def.id, &def.default_values()).unwrap();
            let typed = BacktestParameters::new(StrategyParams::defaults(def.id));
            assert_eq!(from_catalog, typed, "{}", def.id);
        }
    }

    #[test]
    fn test_from_values_overrides_and_fills() {
        let values = HashMap::from([
            ("shortPeriod".to_string(), 5.0),
            ("initialCapital".to_string(), 25000.0),
        ]);
        let params = BacktestParameters::from_values(StrategyId::SmaCrossover, &values).unwrap();

        assert_eq!(params.initial_capital, 25000.0);
        assert_eq!(
            params.strategy,
            StrategyParams::SmaCrossover(SmaCrossoverParams {
                short_period: 5,
                long_period: 30,
            })
        );
    }

    #[test]
    fn test_from_values_rejects_foreign_key() {
        let values = HashMap::from([("stdDev".to_string(), 2.5)]);
        let err = BacktestParameters::from_values(StrategyId::Rsi, &values).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::UnknownParameter { ref name, .. } if name == "stdDev"
        ));
    }

    #[test]
    fn test_from_values_does_not_clamp() {
        let values = HashMap::from([
            ("lookbackPeriod".to_string(), -3.0),
            ("entryThreshold".to_string(), 9.0),
        ]);
        let params = BacktestParameters::from_values(StrategyId::MeanReversion, &values).unwrap();
        match params.strategy {
            StrategyParams::MeanReversion(p) => {
                assert_eq!(p.lookback_period, 0);
                assert_eq!(p.entry_threshold, 9.0);
            }
            other => panic!("unexpected params: {:?}", other),
        }
    }

    #[test]
    fn test_serde_tagged_by_strategy_id() {
        let params = BacktestParameters::new(StrategyParams::Bollinger(BollingerParams {
            period: 10,
            std_dev: 1.5,
        }))
        .with_capital(5000.0);

        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains(r#""strategy":"bollinger""#));
        assert!(json.contains(r#""stdDev":1.5"#));

        let back: BacktestParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
        assert_eq!(back.strategy.id(), StrategyId::Bollinger);
    }
}
