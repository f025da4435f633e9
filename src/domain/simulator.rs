//! Trading simulation over a historical signal.
//!
//! The simulator alternates between wanting to buy and wanting to sell. It
//! scans forward for the next index whose signal matches the wanted side,
//! buys with all available cash at the ask price or sells the whole held
//! quantity at the bid price, and stops once no matching index remains.
//! An open position left at the end is unwound at its purchase price, so
//! only closed round-trips count.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub initial_cash: f64,
    /// Fee in percent of the traded notional.
    pub fee_pct: f64,
    /// Penalty applied when no round-trip happened.
    pub cost_no_action: f64,
    pub min_trades_per_day: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100.0,
            fee_pct: 0.1,
            cost_no_action: 100.0,
            min_trades_per_day: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    fn target(self) -> i8 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub side: Side,
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub quantity: f64,
    pub fee: f64,
}

impl Trade {
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub final_cash: f64,
    /// Profit or loss after penalties.
    pub pnl: f64,
    pub wins: u32,
    pub losses: u32,
    /// Executed trades of closed round-trips, in order.
    pub trades: Vec<Trade>,
}

impl SimulationResult {
    pub fn round_trips(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Replays `signal` against the ask/bid prices sharing its index.
///
/// `ask` and `bid` must be at least as long as `signal`; an index with an
/// absent price is skipped as if its signal did not match.
pub fn simulate_trading(
    signal: &[i8],
    index: &[NaiveDateTime],
    ask: &[Option<f64>],
    bid: &[Option<f64>],
    config: &SimulationConfig,
) -> SimulationResult {
    let len = signal.len().min(index.len()).min(ask.len()).min(bid.len());
    let mut cash = config.initial_cash;
    let mut held = 0.0;
    let mut side = Side::Buy;
    let mut next = 0;
    let mut trades: Vec<Trade> = Vec::new();

    loop {
        let prices = match side {
            Side::Buy => ask,
            Side::Sell => bid,
        };
        let Some((i, price)) = (next..len).find_map(|i| match prices[i] {
            Some(p) if signal[i] == side.target() && p > 0.0 => Some((i, p)),
            _ => None,
        }) else {
            break;
        };

        match side {
            Side::Buy => {
                if cash <= 0.0 {
                    break;
                }
                let fee = cash * config.fee_pct / 100.0;
                let quantity = (cash - fee) / price;
                held += quantity;
                cash = 0.0;
                trades.push(Trade {
                    side,
                    index: i,
                    timestamp: index[i],
                    price,
                    quantity,
                    fee,
                });
                side = Side::Sell;
            }
            Side::Sell => {
                let quantity = held;
                let notional = quantity * price;
                let fee = notional * config.fee_pct / 100.0;
                cash += notional - fee;
                held = 0.0;
                trades.push(Trade {
                    side,
                    index: i,
                    timestamp: index[i],
                    price,
                    quantity,
                    fee,
                });
                side = Side::Buy;
            }
        }
        if let Some(trade) = trades.last() {
            tracing::debug!(
                side = %trade.side,
                time = %trade.timestamp,
                quantity = trade.quantity,
                price = trade.price,
                cash,
                "simulated trade"
            );
        }
        next = i + 1;
    }

    if side == Side::Sell {
        if let Some(open) = trades.pop() {
            cash += open.notional() + open.fee;
        }
    }

    let mut wins = 0;
    let mut losses = 0;
    for pair in trades.chunks_exact(2) {
        let (bought, sold) = (pair[0].notional(), pair[1].notional());
        if sold > bought {
            wins += 1;
        } else if sold < bought {
            losses += 1;
        }
    }

    let mut pnl = cash - config.initial_cash;
    if trades.is_empty() {
        pnl -= config.cost_no_action;
    }
    let expected = config.min_trades_per_day * duration_days(&index[..len]);
    let realized = (wins + losses) as f64;
    if realized <= expected {
        pnl += realized - expected;
    }

    SimulationResult {
        final_cash: cash,
        pnl,
        wins,
        losses,
        trades,
    }
}

/// Span between the first and last timestamp, in days.
pub fn duration_days(index: &[NaiveDateTime]) -> f64 {
    match (index.first(), index.last()) {
        (Some(first), Some(last)) => {
            (*last - *first).num_milliseconds() as f64 / 86_400_000.0
        }
        _ => 0.0,
    }
}
