use std::time::Instant;

use common::{BacktestParameters, BacktestResult, PriceBar, StrategyId, TradeType};
use rayon::prelude::*;
use tracing::debug;

use crate::metrics::PerformanceTracker;
use crate::portfolio::Portfolio;
use crate::strategies;

/// Single-strategy backtest engine
///
/// Every call to [`run`](Self::run) allocates its own portfolio and
/// accumulators, so one engine can be shared across threads.
pub struct BacktestEngine {
    params: BacktestParameters,
}

impl BacktestEngine {
    pub fn new(params: BacktestParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BacktestParameters {
        &self.params
    }

    /// Run backtest on provided bar data
    ///
    /// An empty series yields an empty equity curve. A series shorter than
    /// the strategy's start index yields only the seed equity point. Neither
    /// is an error.
    pub fn run(&self, bars: &[PriceBar]) -> BacktestResult {
        let start_time = Instant::now();
        let initial_capital = self.params.initial_capital;

        let Some(first_bar) = bars.first() else {
            debug!(strategy = %self.params.strategy.id(), "empty price series");
            return BacktestResult::degenerate(vec![]);
        };

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut signals = strategies::build(&self.params.strategy, &closes);

        let mut portfolio = Portfolio::new(initial_capital);
        let mut tracker = PerformanceTracker::new(initial_capital, &first_bar.date);

        for (i, bar) in bars.iter().enumerate().skip(signals.start_index()) {
            if let Some(signal) = signals.on_bar(i, bar.close, portfolio.in_position()) {
                let fill = match signal.trade_type {
                    TradeType::Buy => portfolio.buy(&bar.date, bar.close),
                    TradeType::Sell => portfolio.sell(&bar.date, bar.close),
                };
                if let Some(trade) = fill {
                    debug!(
                        strategy = signals.name(),
                        date = %trade.date,
                        side = ?trade.trade_type,
                        price = trade.price,
                        shares = trade.shares,
                        reason = %signal.reason,
                        "fill"
                    );
                }
            }

            tracker.record(&bar.date, portfolio.value(bar.close));
        }

        // Close any remaining position at the last bar
        if let Some(last_bar) = bars.last() {
            if let Some(trade) = portfolio.sell(&last_bar.date, last_bar.close).cloned() {
                debug!(
                    strategy = signals.name(),
                    date = %trade.date,
                    price = trade.price,
                    shares = trade.shares,
                    realized = portfolio.profit_loss(),
                    "end of backtest"
                );
            }
        }

        let final_capital = portfolio.cash();
        let result = tracker.finish(portfolio.into_trades(), final_capital);

        debug!(
            strategy = signals.name(),
            bars = bars.len(),
            trades = result.trades.len(),
            profit_loss = result.profit_loss,
            max_drawdown = result.max_drawdown,
            sharpe_ratio = result.sharpe_ratio,
            elapsed_us = start_time.elapsed().as_micros() as u64,
            "backtest complete"
        );

        result
    }
}

/// Run one backtest
pub fn run_backtest(bars: &[PriceBar], params: &BacktestParameters) -> BacktestResult {
    BacktestEngine::new(*params).run(bars)
}

/// Run several independent backtests over the same series in parallel
///
/// Results keep the order of `params`.
pub fn compare_strategies(
    bars: &[PriceBar],
    params: &[BacktestParameters],
) -> Vec<(StrategyId, BacktestResult)> {
    params
        .par_iter()
        .map(|p| (p.strategy.id(), run_backtest(bars, p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{bars_from_closes, generate_synthetic_bars};
    use approx::assert_relative_eq;
    use common::{
        BollingerParams, MacdParams, MeanReversionParams, RsiParams, SmaCrossoverParams,
        StrategyParams, Trade,
    };

    fn params(strategy: StrategyParams) -> BacktestParameters {
        BacktestParameters::new(strategy).with_capital(10000.0)
    }

    fn all_defaults() -> Vec<BacktestParameters> {
        StrategyId::ALL
            .iter()
            .map(|&id| params(StrategyParams::defaults(id)))
            .collect()
    }

    fn assert_trade(trade: &Trade, date: &str, price: f64, trade_type: TradeType, shares: u64) {
        assert_eq!(trade.date, date);
        assert_eq!(trade.price, price);
        assert_eq!(trade.trade_type, trade_type);
        assert_eq!(trade.shares, shares);
    }

    /// 100, 101, ..., 139
    fn rising_closes() -> Vec<f64> {
        (0..40).map(|i| 100.0 + i as f64).collect()
    }

    /// 130 down to 106 by 1, then up to 156 by 2
    fn v_shaped_closes() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..25).map(|i| 130.0 - i as f64).collect();
        closes.extend((1..26).map(|i| 106.0 + 2.0 * i as f64));
        closes
    }

    /// Drops by 2 for 14 bars from 100, then rises by 2 for 14 bars
    fn dip_and_recovery_closes() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..15).map(|i| 100.0 - 2.0 * i as f64).collect();
        closes.extend((1..15).map(|i| 72.0 + 2.0 * i as f64));
        closes
    }

    #[test]
    fn test_sma_crossover_rising_series_never_crosses() {
        // The short SMA already leads when the loop starts, so no crossover occurs
        let bars = bars_from_closes(&rising_closes());
        let result = run_backtest(
            &bars,
            &params(StrategyParams::SmaCrossover(SmaCrossoverParams {
                short_period: 5,
                long_period: 20,
            })),
        );

        assert!(result.trades.is_empty());
        assert_eq!(result.profit_loss, 0.0);
        assert_eq!(result.returns.len(), 1 + 40 - 20);
        assert!(result.returns.iter().all(|p| p.value == 10000.0));
    }

    #[test]
    fn test_sma_crossover_single_buy_force_closed() {
        let bars = bars_from_closes(&v_shaped_closes());
        let result = run_backtest(
            &bars,
            &params(StrategyParams::SmaCrossover(SmaCrossoverParams {
                short_period: 5,
                long_period: 20,
            })),
        );

        assert_eq!(result.trades.len(), 2);
        assert_trade(&result.trades[0], "2024-01-31", 118.0, TradeType::Buy, 84);
        // Forced exit at the final bar
        assert_trade(&result.trades[1], "2024-02-19", 156.0, TradeType::Sell, 84);
        assert_relative_eq!(result.profit_loss, 84.0 * 38.0, epsilon = 1e-6);
        assert!(result.profit_loss > 0.0);
        assert_eq!(result.max_drawdown, 0.0);
    }

    #[test]
    fn test_sma_crossover_round_trip() {
        let mut closes = v_shaped_closes();
        closes.extend((1..21).map(|i| 154.0 - 3.0 * i as f64));
        let bars = bars_from_closes(&closes);

        let result = run_backtest(
            &bars,
            &params(StrategyParams::SmaCrossover(SmaCrossoverParams {
                short_period: 5,
                long_period: 20,
            })),
        );

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].price, 118.0);
        // Real crossover exit before the end of the series
        assert_trade(&result.trades[1], &bars[55].date, 136.0, TradeType::Sell, 84);
        assert_relative_eq!(result.profit_loss, 84.0 * 18.0, epsilon = 1e-6);
        assert!(result.max_drawdown > 0.0);
    }

    #[test]
    fn test_rsi_buys_once_after_oversold_recovery() {
        let bars = bars_from_closes(&dip_and_recovery_closes());
        let result = run_backtest(&bars, &params(StrategyParams::Rsi(RsiParams::default())));

        // RSI reaches 0 at bar 14 and first exceeds 30 at bar 19
        assert_eq!(result.buy_count(), 1);
        assert_trade(&result.trades[0], &bars[19].date, 82.0, TradeType::Buy, 121);
        assert_trade(&result.trades[1], &bars[28].date, 100.0, TradeType::Sell, 121);
        assert_relative_eq!(result.profit_loss, 121.0 * 18.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rsi_sells_after_overbought_fades() {
        let mut closes = dip_and_recovery_closes();
        closes.extend((15..30).map(|i| 72.0 + 2.0 * i as f64));
        closes.extend((1..15).map(|i| 130.0 - 2.0 * i as f64));
        let bars = bars_from_closes(&closes);

        let result = run_backtest(&bars, &params(StrategyParams::Rsi(RsiParams::default())));

        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].price, 82.0);
        assert_trade(&result.trades[1], &bars[48].date, 120.0, TradeType::Sell, 121);
        assert_relative_eq!(result.profit_loss, 121.0 * 38.0, epsilon = 1e-6);
    }

    #[test]
    fn test_macd_crossovers() {
        let mut closes: Vec<f64> = (0..40).map(|i| 150.0 - i as f64).collect();
        closes.extend((1..41).map(|i| 111.0 + 1.5 * i as f64));
        closes.extend((1..31).map(|i| 170.0 - 2.0 * i as f64));
        let bars = bars_from_closes(&closes);

        let result = run_backtest(&bars, &params(StrategyParams::Macd(MacdParams::default())));

        assert_eq!(result.trades.len(), 2);
        assert_trade(&result.trades[0], &bars[41].date, 114.0, TradeType::Buy, 87);
        assert_trade(&result.trades[1], &bars[81].date, 166.0, TradeType::Sell, 87);
        assert_relative_eq!(result.profit_loss, 87.0 * 52.0, epsilon = 1e-6);
        // MACD starts evaluating at max(12, 26) + 9
        assert_eq!(result.returns.len(), 1 + closes.len() - 35);
    }

    #[test]
    fn test_bollinger_band_touches() {
        let mut closes: Vec<f64> = (0..25)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        closes.extend([96.0, 100.0, 101.0, 100.0, 101.0, 104.0, 101.0, 100.0]);
        let bars = bars_from_closes(&closes);

        let result = run_backtest(
            &bars,
            &params(StrategyParams::Bollinger(BollingerParams::default())),
        );

        assert_eq!(result.trades.len(), 2);
        assert_trade(&result.trades[0], &bars[25].date, 96.0, TradeType::Buy, 104);
        assert_trade(&result.trades[1], &bars[30].date, 104.0, TradeType::Sell, 104);
        assert_relative_eq!(result.profit_loss, 832.0, epsilon = 1e-6);
        assert_relative_eq!(result.profit_loss_percent, 8.32, epsilon = 1e-9);
    }

    #[test]
    fn test_mean_reversion_entry_and_exit() {
        let mut closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        closes.extend([94.0, 97.0, 101.0, 100.0]);
        let bars = bars_from_closes(&closes);

        let result = run_backtest(
            &bars,
            &params(StrategyParams::MeanReversion(MeanReversionParams::default())),
        );

        assert_eq!(result.trades.len(), 2);
        assert_trade(&result.trades[0], &bars[20].date, 94.0, TradeType::Buy, 106);
        assert_trade(&result.trades[1], &bars[22].date, 101.0, TradeType::Sell, 106);
        assert_relative_eq!(result.profit_loss, 742.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_reversion_flat_window_never_trades() {
        let bars = bars_from_closes(&[100.0; 40]);
        let result = run_backtest(
            &bars,
            &params(StrategyParams::MeanReversion(MeanReversionParams::default())),
        );

        assert!(result.trades.is_empty());
    }

    #[test]
    fn test_flat_series_is_degenerate_for_every_strategy() {
        let bars = bars_from_closes(&[100.0; 60]);

        for p in all_defaults() {
            let result = run_backtest(&bars, &p);
            assert_eq!(result.sharpe_ratio, 0.0, "{}", p.strategy.id());
            assert_eq!(result.max_drawdown, 0.0, "{}", p.strategy.id());
            assert_eq!(result.profit_loss, 0.0, "{}", p.strategy.id());
        }
    }

    #[test]
    fn test_empty_series() {
        for p in all_defaults() {
            let result = run_backtest(&[], &p);
            assert!(result.trades.is_empty());
            assert!(result.returns.is_empty());
            assert_eq!(result.profit_loss, 0.0);
            assert_eq!(result.sharpe_ratio, 0.0);
        }
    }

    #[test]
    fn test_series_shorter_than_start_index() {
        let bars = bars_from_closes(&[100.0, 99.0, 98.0, 101.0, 103.0]);

        for p in all_defaults() {
            let result = run_backtest(&bars, &p);
            assert!(result.trades.is_empty());
            assert_eq!(result.returns.len(), 1);
            assert_eq!(result.returns[0].date, bars[0].date);
            assert_eq!(result.returns[0].value, 10000.0);
            assert_eq!(result.profit_loss, 0.0);
            assert_eq!(result.max_drawdown, 0.0);
            assert_eq!(result.sharpe_ratio, 0.0);
        }
    }

    #[test]
    fn test_degenerate_periods_do_not_panic() {
        let bars = generate_synthetic_bars(50, 100.0, Some(3));
        let strategies = [
            StrategyParams::SmaCrossover(SmaCrossoverParams {
                short_period: 0,
                long_period: 0,
            }),
            StrategyParams::Rsi(RsiParams {
                period: 0,
                overbought: 70.0,
                oversold: 30.0,
            }),
            StrategyParams::Macd(MacdParams {
                fast_period: 0,
                slow_period: 0,
                signal_period: 0,
            }),
            StrategyParams::Bollinger(BollingerParams {
                period: 0,
                std_dev: 2.0,
            }),
            StrategyParams::MeanReversion(MeanReversionParams {
                lookback_period: 0,
                entry_threshold: 1.5,
                exit_threshold: 0.5,
            }),
        ];

        for strategy in strategies {
            let result = run_backtest(&bars, &params(strategy));
            assert_eq!(result.trades.len() % 2, 0);
        }
    }

    #[test]
    fn test_invariants_on_random_walks() {
        for seed in 0..8 {
            let bars = generate_synthetic_bars(400, 50.0, Some(seed));

            for p in all_defaults() {
                let result = run_backtest(&bars, &p);
                let id = p.strategy.id();

                // Strict Buy/Sell alternation, ending flat
                assert_eq!(result.trades.len() % 2, 0, "{} seed {}", id, seed);
                for (i, trade) in result.trades.iter().enumerate() {
                    let expected = if i % 2 == 0 { TradeType::Buy } else { TradeType::Sell };
                    assert_eq!(trade.trade_type, expected, "{} seed {}", id, seed);
                }
                for (buy, sell) in result.round_trips() {
                    assert_eq!(buy.shares, sell.shares);
                }

                // Cash never goes negative
                let mut cash = p.initial_capital;
                for trade in &result.trades {
                    match trade.trade_type {
                        TradeType::Buy => cash -= trade.value(),
                        TradeType::Sell => cash += trade.value(),
                    }
                    assert!(cash >= -1e-9, "{} seed {}", id, seed);
                }
                assert_relative_eq!(
                    result.final_capital(p.initial_capital),
                    cash,
                    epsilon = 1e-6
                );

                assert!((0.0..=1.0).contains(&result.max_drawdown));
                assert!(result.sharpe_ratio.is_finite());
                assert_eq!(result.returns[0].value, p.initial_capital);
                assert_eq!(result.returns[0].date, bars[0].date);
            }
        }
    }

    #[test]
    fn test_runs_are_deterministic() {
        let bars = generate_synthetic_bars(300, 80.0, Some(42));

        for p in all_defaults() {
            let first = run_backtest(&bars, &p);
            let second = run_backtest(&bars, &p);
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn test_compare_matches_sequential_runs() {
        let bars = generate_synthetic_bars(250, 60.0, Some(7));
        let configs = all_defaults();

        let compared = compare_strategies(&bars, &configs);

        assert_eq!(compared.len(), configs.len());
        for ((id, result), p) in compared.iter().zip(&configs) {
            assert_eq!(*id, p.strategy.id());
            assert_eq!(*result, run_backtest(&bars, p));
        }
    }

    #[test]
    fn test_engine_exposes_params() {
        let p = params(StrategyParams::Rsi(RsiParams::default())).with_capital(5000.0);
        let engine = BacktestEngine::new(p);
        assert_eq!(engine.params().initial_capital, 5000.0);
    }
}
