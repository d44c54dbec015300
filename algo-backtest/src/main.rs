use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use algo_backtest::{
    compare_strategies, drawdown_curve, generate_synthetic_bars, load_file, run_backtest,
    BacktestParameters, BacktestResult, PriceBar, StrategyId, StrategyParams,
};
use common::catalog::{self, INITIAL_CAPITAL_KEY};

#[derive(Parser, Debug)]
#[command(name = "algo-backtest")]
#[command(version = "0.1.0")]
#[command(about = "Single-asset daily strategy backtester", long_about = None)]
struct Cli {
    /// Enable debug logging (per-trade fills)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Backtest one strategy
    Run {
        /// Strategy id (see `list`)
        #[arg(short, long)]
        strategy: String,

        /// Strategy parameter override, e.g. `--param shortPeriod=5`
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        #[command(flatten)]
        run: RunOptions,
    },
    /// Backtest every strategy with its default parameters
    Compare {
        #[command(flatten)]
        run: RunOptions,
    },
    /// Print the strategy catalog
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct RunOptions {
    /// Initial capital
    #[arg(short, long)]
    capital: Option<f64>,

    /// Data file path (CSV/JSON). If not provided, uses synthetic data.
    #[arg(short = 'f', long)]
    data_file: Option<PathBuf>,

    /// Number of days of synthetic data
    #[arg(short, long, default_value = "250")]
    days: usize,

    /// Initial price for synthetic data
    #[arg(long, default_value = "100.0")]
    initial_price: f64,

    /// Seed for synthetic data
    #[arg(long)]
    seed: Option<u64>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run {
            strategy,
            params,
            run,
        } => cmd_run(&strategy, &params, &run),
        Command::Compare { run } => cmd_compare(&run),
        Command::List { json } => cmd_list(json),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "debug,algo_backtest=debug"
    } else {
        "info,algo_backtest=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();
}

fn cmd_run(strategy: &str, raw_params: &[String], run: &RunOptions) -> Result<()> {
    let id: StrategyId = strategy.parse()?;

    let mut values = parse_param_overrides(raw_params)?;
    if let Some(capital) = run.capital {
        values.insert(INITIAL_CAPITAL_KEY.to_string(), capital);
    }

    for violation in catalog::check_bounds(id, &values) {
        warn!(strategy = %id, "{}", violation);
    }

    let params = BacktestParameters::from_values(id, &values)?;
    let bars = load_bars(run)?;

    info!(strategy = %id, bars = bars.len(), capital = params.initial_capital, "running backtest");
    let result = run_backtest(&bars, &params);

    match run.output.as_str() {
        "json" => println!("{}", to_json(&result, run.pretty)?),
        "text" => print_text_report(id, &params, &bars, &result),
        other => bail!("Unknown output format: {}", other),
    }

    Ok(())
}

fn cmd_compare(run: &RunOptions) -> Result<()> {
    let bars = load_bars(run)?;
    let configs: Vec<BacktestParameters> = StrategyId::ALL
        .iter()
        .map(|&id| {
            let params = BacktestParameters::new(StrategyParams::defaults(id));
            match run.capital {
                Some(capital) => params.with_capital(capital),
                None => params,
            }
        })
        .collect();

    info!(strategies = configs.len(), bars = bars.len(), "comparing strategies");
    let results = compare_strategies(&bars, &configs);

    match run.output.as_str() {
        "json" => println!("{}", to_json(&comparison_entries(&results), run.pretty)?),
        "text" => print_comparison(&results),
        other => bail!("Unknown output format: {}", other),
    }

    Ok(())
}

fn cmd_list(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog::definitions())?);
        return Ok(());
    }

    for def in catalog::definitions() {
        println!("{:<16} {}", def.id, def.name);
        println!("{:<16} {}", "", def.description);
        for p in def.parameters {
            println!(
                "{:<16}   {:<16} default {:<8} range [{}, {}] step {}",
                "", p.key, p.default, p.min, p.max, p.step
            );
        }
        println!();
    }
    Ok(())
}

/// Parse repeated `key=value` arguments into a parameter map
fn parse_param_overrides(raw: &[String]) -> Result<HashMap<String, f64>> {
    raw.iter()
        .map(|kv| {
            let (key, value) = kv
                .split_once('=')
                .with_context(|| format!("Expected KEY=VALUE, got '{}'", kv))?;
            let value: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid number for '{}': '{}'", key, value))?;
            Ok((key.trim().to_string(), value))
        })
        .collect()
}

fn load_bars(run: &RunOptions) -> Result<Vec<PriceBar>> {
    let bars = if let Some(path) = &run.data_file {
        info!("Loading data from {:?}", path);
        load_file(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        info!(
            days = run.days,
            initial_price = run.initial_price,
            seed = ?run.seed,
            "Generating synthetic data"
        );
        generate_synthetic_bars(run.days, run.initial_price, run.seed)
    };
    Ok(bars)
}

/// One row of `compare` JSON output
#[derive(Serialize)]
struct ComparisonEntry<'a> {
    strategy: StrategyId,
    #[serde(flatten)]
    result: &'a BacktestResult,
}

/// Keep the order of `results` in the JSON array
fn comparison_entries(results: &[(StrategyId, BacktestResult)]) -> Vec<ComparisonEntry<'_>> {
    results
        .iter()
        .map(|(strategy, result)| ComparisonEntry {
            strategy: *strategy,
            result,
        })
        .collect()
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn print_text_report(
    id: StrategyId,
    params: &BacktestParameters,
    bars: &[PriceBar],
    result: &BacktestResult,
) {
    let name = catalog::definition(id).name;
    let initial = params.initial_capital;

    println!();
    println!("================================================================");
    println!("  BACKTEST REPORT - {}", name);
    println!("================================================================");
    println!();
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!("  Period: {} to {}", first.date, last.date);
    }
    println!("  Bars:   {}", bars.len());
    println!();
    println!("----------------------------------------------------------------");
    println!("  CAPITAL");
    println!("----------------------------------------------------------------");
    println!("  Initial Capital:  ${:>12.2}", initial);
    println!("  Final Capital:    ${:>12.2}", result.final_capital(initial));
    println!(
        "  Profit/Loss:      ${:>12.2} ({:+.2}%)",
        result.profit_loss, result.profit_loss_percent
    );
    println!();
    println!("----------------------------------------------------------------");
    println!("  RISK METRICS");
    println!("----------------------------------------------------------------");
    println!("  Sharpe Ratio:     {:>12.3}", result.sharpe_ratio);
    println!("  Max Drawdown:     {:>12.2}%", result.max_drawdown * 100.0);
    let curve = drawdown_curve(&result.returns);
    if let Some(current) = curve.last() {
        println!("  Final Drawdown:   {:>12.2}%", current * 100.0);
    }
    println!();
    println!("----------------------------------------------------------------");
    println!("  TRADES");
    println!("----------------------------------------------------------------");
    println!("  Round Trips:      {:>12}", result.round_trips().len());
    let fills = format!("{} / {}", result.buy_count(), result.sell_count());
    println!("  Buys / Sells:     {:>12}", fills);
    println!();
    println!("================================================================");

    if !result.trades.is_empty() {
        println!();
        println!("  RECENT ROUND TRIPS (last 5)");
        println!("----------------------------------------------------------------");
        let trips = result.round_trips();
        for (buy, sell) in trips.iter().rev().take(5) {
            let pnl = sell.value() - buy.value();
            println!(
                "  {} @ {:.2} -> {} @ {:.2} | {} sh | P&L: ${:+.2}",
                buy.date, buy.price, sell.date, sell.price, buy.shares, pnl
            );
        }
        println!();
    }
}

fn print_comparison(results: &[(StrategyId, BacktestResult)]) {
    println!();
    println!(
        "  {:<16} {:>8} {:>14} {:>10} {:>10} {:>8}",
        "STRATEGY", "TRADES", "P&L", "P&L %", "MAX DD %", "SHARPE"
    );
    println!("  {}", "-".repeat(71));
    for (id, result) in results {
        println!(
            "  {:<16} {:>8} {:>14.2} {:>10.2} {:>10.2} {:>8.3}",
            id.as_str(),
            result.trades.len(),
            result.profit_loss,
            result.profit_loss_percent,
            result.max_drawdown * 100.0,
            result.sharpe_ratio
        );
    }
    println!();
}
