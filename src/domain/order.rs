//! Actions and orders: the rule layer above conditions.
//!
//! An `Action` holds when all of its conditions hold. An `Order` ORs its
//! actions per polarity and merges both sides into a signal per timestamp:
//! `1` buy, `-1` sell, `0` when neither or both fire.

use crate::domain::condition::Condition;
use crate::domain::market::Market;
use crate::domain::series::SeriesStamp;
use crate::domain::simulator::{self, SimulationConfig, SimulationResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Buy,
    Sell,
}

impl Polarity {
    pub fn from_token(token: &str) -> Option<Polarity> {
        match token {
            "buy" => Some(Polarity::Buy),
            "sell" => Some(Polarity::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Buy => f.write_str("buy"),
            Polarity::Sell => f.write_str("sell"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Action {
    pub polarity: Polarity,
    pub conditions: Vec<Condition>,
    pub values: Vec<bool>,
}

impl Action {
    pub fn new(polarity: Polarity) -> Self {
        Self {
            polarity,
            conditions: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_conditions(polarity: Polarity, conditions: Vec<Condition>) -> Self {
        Self {
            polarity,
            conditions,
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    /// Updates every condition and ANDs them per timestamp. An action
    /// without conditions never holds.
    pub fn update(&mut self, market: &mut Market, force: bool) {
        for condition in &mut self.conditions {
            condition.update(market, force);
        }
        let len = market.len();
        if self.conditions.is_empty() {
            self.values = vec![false; len];
            return;
        }
        self.values = (0..len)
            .map(|i| {
                self.conditions
                    .iter()
                    .all(|c| c.values.get(i).copied().unwrap_or(false))
            })
            .collect();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Order {
    pub actions: Vec<Action>,
    pub signal: Vec<i8>,
    stamp: SeriesStamp,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(actions: Vec<Action>) -> Self {
        Self {
            actions,
            ..Self::default()
        }
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions_of(&self, polarity: Polarity) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.polarity == polarity)
    }

    /// Updates every action, then rebuilds the signal when the market grew
    /// since the last update or when `force` is set.
    pub fn update(&mut self, market: &mut Market, force: bool) {
        for action in &mut self.actions {
            action.update(market, force);
        }
        let stamp = market.series(market.ask()).stamp();
        if !force && stamp == self.stamp && self.signal.len() == market.len() {
            return;
        }
        let buy = self.side(Polarity::Buy, market.len());
        let sell = self.side(Polarity::Sell, market.len());
        self.signal = buy
            .iter()
            .zip(&sell)
            .map(|(b, s)| *b as i8 - *s as i8)
            .collect();
        self.stamp = stamp;
    }

    fn side(&self, polarity: Polarity, len: usize) -> Vec<bool> {
        (0..len)
            .map(|i| {
                self.actions_of(polarity)
                    .any(|a| a.values.get(i).copied().unwrap_or(false))
            })
            .collect()
    }

    /// Signal at the latest timestamp after a forced update, `0` for an
    /// empty market.
    pub fn action(&mut self, market: &mut Market) -> i8 {
        self.update(market, true);
        self.signal.last().copied().unwrap_or(0)
    }

    /// Replays the order's historical signal against the market prices.
    pub fn simulate_trading(
        &mut self,
        market: &mut Market,
        config: &SimulationConfig,
    ) -> SimulationResult {
        self.update(market, false);
        simulator::simulate_trading(
            &self.signal,
            market.time_index(),
            &market.series(market.ask()).values,
            &market.series(market.bid()).values,
            config,
        )
    }
}
