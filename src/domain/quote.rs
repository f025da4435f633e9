//! Market quote sample.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub time: NaiveDateTime,
    pub ask: f64,
    pub bid: f64,
    pub volume: f64,
}
