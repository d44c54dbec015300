use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use common::{BacktestError, PriceBar, Result};

/// Load bars from a CSV file with a header row
///
/// The `date` and `close` columns are located by name, ignoring case.
/// Any other columns are skipped.
pub fn load_csv(path: &Path) -> Result<Vec<PriceBar>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| BacktestError::CsvError(e.to_string()))?
        .clone();
    let date_col = find_column(&headers, "date")?;
    let close_col = find_column(&headers, "close")?;

    let mut bars = Vec::new();

    for (row, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| BacktestError::CsvError(e.to_string()))?;

        let (Some(date), Some(close)) = (record.get(date_col), record.get(close_col)) else {
            return Err(BacktestError::CsvError(format!(
                "Row {} is missing the date or close column",
                row + 1
            )));
        };

        let close: f64 = close.parse().map_err(|_| {
            BacktestError::CsvError(format!("Invalid close price on row {}: {}", row + 1, close))
        })?;

        bars.push(PriceBar::new(date, close));
    }

    Ok(bars)
}

/// Load bars from a JSON array of `{date, close}` objects
pub fn load_json(path: &Path) -> Result<Vec<PriceBar>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let bars: Vec<PriceBar> = serde_json::from_reader(reader)?;
    Ok(bars)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| BacktestError::CsvError(format!("Missing '{}' column", name)))
}
