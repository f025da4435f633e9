//! Quote history port trait.

use crate::domain::error::TradeError;
use crate::domain::quote::Quote;

pub trait QuotePort {
    /// Every available quote, sorted by time.
    fn load_quotes(&self) -> Result<Vec<Quote>, TradeError>;
}
