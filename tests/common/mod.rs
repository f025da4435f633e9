#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use quotetrader::domain::error::TradeError;
use quotetrader::domain::market::Market;
pub use quotetrader::domain::quote::Quote;
use quotetrader::ports::quote_port::QuotePort;

pub struct MockQuotePort {
    pub quotes: Vec<Quote>,
    pub error: Option<String>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            quotes: Vec::new(),
            error: None,
        }
    }

    pub fn with_quotes(mut self, quotes: Vec<Quote>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl QuotePort for MockQuotePort {
    fn load_quotes(&self) -> Result<Vec<Quote>, TradeError> {
        if let Some(reason) = &self.error {
            return Err(TradeError::DataLoad {
                reason: reason.clone(),
            });
        }
        Ok(self.quotes.clone())
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn minute(i: usize) -> NaiveDateTime {
    start() + chrono::Duration::minutes(i as i64)
}

/// One quote per minute, `ask = bid = price`.
pub fn make_quotes(prices: &[f64]) -> Vec<Quote> {
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| Quote {
            time: minute(i),
            ask: *p,
            bid: *p,
            volume: 10.0,
        })
        .collect()
}

pub fn make_market(prices: &[f64]) -> Market {
    Market::from_quotes(&make_quotes(prices))
}

/// Deterministic zig-zag price path around 100.
pub fn generate_prices(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 100.0 + ((i * 7) % 11) as f64 - 5.0 + (i as f64) * 0.05)
        .collect()
}

pub fn write_temp(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn quotes_csv(prices: &[f64]) -> String {
    let mut csv = String::from("time,ask,bid,volume\n");
    for quote in make_quotes(prices) {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            quote.time.format("%Y-%m-%d %H:%M:%S"),
            quote.ask,
            quote.bid,
            quote.volume
        ));
    }
    csv
}
