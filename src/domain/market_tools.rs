//! Helpers turning a loaded quote history into markets.

use crate::domain::market::Market;
use crate::domain::quote::Quote;
use chrono::Duration;

/// Default largest gap, in seconds, between two quotes of one segment.
pub const DEFAULT_SPLIT_GAP_SECONDS: i64 = 120;

/// Splits `quotes` wherever two consecutive timestamps are more than
/// `max_gap` apart. Each segment keeps its quotes in input order.
pub fn split_on_gaps(quotes: &[Quote], max_gap: Duration) -> Vec<Vec<Quote>> {
    let mut segments: Vec<Vec<Quote>> = Vec::new();
    let mut current: Vec<Quote> = Vec::new();
    for quote in quotes {
        if let Some(prev) = current.last() {
            if quote.time - prev.time > max_gap {
                segments.push(std::mem::take(&mut current));
            }
        }
        current.push(*quote);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// One market per gap-free segment, each with the given retention budget.
pub fn markets_from_quotes(quotes: &[Quote], max_gap: Duration, max_rows: usize) -> Vec<Market> {
    split_on_gaps(quotes, max_gap)
        .iter()
        .map(|segment| {
            let mut market = Market::from_quotes(segment);
            market.set_max_rows(max_rows);
            market
        })
        .collect()
}
