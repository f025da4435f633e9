//! Conditions: boolean series derived from a property and a threshold.
//!
//! Absent property values never satisfy a comparison. Cross detection needs
//! two consecutive defined values, so the first index is always false.

use crate::domain::market::Market;
use crate::domain::property::NodeId;
use crate::domain::series::SeriesStamp;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Greater,
    Lower,
    CrossUp,
    /// Cross up, held true for the following `n` indices.
    CrossUpWithin(usize),
    CrossDown,
    /// Cross down, held true for the following `n` indices.
    CrossDownWithin(usize),
}

impl ConditionOperator {
    /// Parses the request symbol: `>`, `<`, `+=`, `-=`, `+=5`, `+=10`,
    /// `-=5`, `-=10`.
    pub fn from_symbol(symbol: &str) -> Option<ConditionOperator> {
        let op = match symbol {
            ">" => ConditionOperator::Greater,
            "<" => ConditionOperator::Lower,
            "+=" => ConditionOperator::CrossUp,
            "+=5" => ConditionOperator::CrossUpWithin(5),
            "+=10" => ConditionOperator::CrossUpWithin(10),
            "-=" => ConditionOperator::CrossDown,
            "-=5" => ConditionOperator::CrossDownWithin(5),
            "-=10" => ConditionOperator::CrossDownWithin(10),
            _ => return None,
        };
        Some(op)
    }

    /// Applies the comparison to a whole series.
    pub fn evaluate(self, values: &[Option<f64>], threshold: f64) -> Vec<bool> {
        match self {
            ConditionOperator::Greater => greater_than(values, threshold),
            ConditionOperator::Lower => lower_than(values, threshold),
            ConditionOperator::CrossUp => cross_up(values, threshold),
            ConditionOperator::CrossUpWithin(n) => hold_for(&cross_up(values, threshold), n),
            ConditionOperator::CrossDown => cross_down(values, threshold),
            ConditionOperator::CrossDownWithin(n) => {
                hold_for(&cross_down(values, threshold), n)
            }
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionOperator::Greater => f.write_str(">"),
            ConditionOperator::Lower => f.write_str("<"),
            ConditionOperator::CrossUp => f.write_str("+="),
            ConditionOperator::CrossUpWithin(n) => write!(f, "+={}", n),
            ConditionOperator::CrossDown => f.write_str("-="),
            ConditionOperator::CrossDownWithin(n) => write!(f, "-={}", n),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Condition {
    pub property: NodeId,
    pub operator: ConditionOperator,
    pub threshold: f64,
    pub values: Vec<bool>,
    stamp: SeriesStamp,
}

impl Condition {
    pub fn new(property: NodeId, operator: ConditionOperator, threshold: f64) -> Self {
        Self {
            property,
            operator,
            threshold,
            values: Vec::new(),
            stamp: SeriesStamp::default(),
        }
    }

    /// Refreshes the property, then recomputes when its series changed since
    /// the last evaluation or when `force` is set.
    pub fn update(&mut self, market: &mut Market, force: bool) {
        market.update(self.property);
        let series = market.series(self.property);
        let stamp = series.stamp();
        if !force && stamp == self.stamp && self.values.len() == series.len() {
            return;
        }
        self.values = self.operator.evaluate(&series.values, self.threshold);
        self.stamp = stamp;
    }
}

pub fn greater_than(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    values
        .iter()
        .map(|v| v.is_some_and(|x| x > threshold))
        .collect()
}

pub fn lower_than(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    values
        .iter()
        .map(|v| v.is_some_and(|x| x < threshold))
        .collect()
}

/// True at `i` when `values[i] >= threshold` and `values[i-1] < threshold`.
pub fn cross_up(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    crossings(values, |prev, curr| prev < threshold && curr >= threshold)
}

/// True at `i` when `values[i] <= threshold` and `values[i-1] > threshold`.
pub fn cross_down(values: &[Option<f64>], threshold: f64) -> Vec<bool> {
    crossings(values, |prev, curr| prev > threshold && curr <= threshold)
}

fn crossings(values: &[Option<f64>], crossed: impl Fn(f64, f64) -> bool) -> Vec<bool> {
    let mut out = vec![false; values.len()];
    if values.len() < 2 {
        return out;
    }
    for i in 1..values.len() {
        if let (Some(prev), Some(curr)) = (values[i - 1], values[i]) {
            out[i] = crossed(prev, curr);
        }
    }
    out
}

/// Extends every true index over the following `n` indices, capped at the
/// end of the series.
pub fn hold_for(flags: &[bool], n: usize) -> Vec<bool> {
    let mut out = flags.to_vec();
    for (i, _) in flags.iter().enumerate().filter(|(_, f)| **f) {
        let end = (i + n + 1).min(out.len());
        out[i..end].iter_mut().for_each(|f| *f = true);
    }
    out
}
