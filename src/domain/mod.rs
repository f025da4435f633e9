//! Core domain types and logic.

pub mod condition;
pub mod diagnostics;
pub mod error;
pub mod indicator;
pub mod market;
pub mod market_tools;
pub mod name_codec;
pub mod order;
pub mod property;
pub mod quote;
pub mod request;
pub mod series;
pub mod settings;
pub mod simulator;
