use chrono::{Duration, NaiveDate};
use common::PriceBar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn date_at(start: NaiveDate, offset: usize) -> String {
    (start + Duration::days(offset as i64))
        .format(DATE_FORMAT)
        .to_string()
}

/// Generate a random-walk daily close series starting 2024-01-01
///
/// The same `seed` always yields the same series; `None` draws from entropy.
pub fn generate_synthetic_bars(
    days: usize,
    initial_price: f64,
    seed: Option<u64>,
) -> Vec<PriceBar> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let start = start_date();
    let mut bars = Vec::with_capacity(days);

    let daily_volatility = 0.02;
    let drift = 0.0002;

    let mut price = initial_price;
    for i in 0..days {
        bars.push(PriceBar::new(date_at(start, i), price));

        let random_return: f64 = rng.gen_range(-1.0..1.0);
        price *= 1.0 + drift + daily_volatility * random_return;
    }

    bars
}

/// Wrap bare closes in bars dated one day apart from 2024-01-01
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = start_date();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::new(date_at(start, i), close))
        .collect()
}
