//! Time-indexed series of optional values.
//!
//! A `TimeSeries` is the unit of data exchanged between the base quotes, the
//! indicator kernels and the rule layer. Absent values (`None`) mark positions
//! where a value is undefined, e.g. during an indicator's warm-up.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub name: String,
    pub index: Vec<NaiveDateTime>,
    pub values: Vec<Option<f64>>,
}

/// Length and last timestamp of a series, used to detect staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeriesStamp {
    pub len: usize,
    pub last: Option<NaiveDateTime>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn from_parts(
        name: impl Into<String>,
        index: Vec<NaiveDateTime>,
        values: Vec<Option<f64>>,
    ) -> Self {
        debug_assert_eq!(index.len(), values.len());
        Self {
            name: name.into(),
            index,
            values,
        }
    }

    /// A series sharing the index of `self`.
    pub fn aligned(&self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::from_parts(name, self.index.clone(), values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().flatten()
    }

    /// Value at `time`, `None` when the timestamp is not in the index.
    pub fn value_at(&self, time: NaiveDateTime) -> Option<f64> {
        self.index
            .binary_search(&time)
            .ok()
            .and_then(|i| self.get(i))
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    pub fn stamp(&self) -> SeriesStamp {
        SeriesStamp {
            len: self.len(),
            last: self.index.last().copied(),
        }
    }

    /// Appends a sample. Timestamps must be strictly increasing; an out of
    /// order sample is rejected and `false` is returned.
    pub fn push(&mut self, time: NaiveDateTime, value: Option<f64>) -> bool {
        if let Some(last) = self.index.last() {
            if time <= *last {
                return false;
            }
        }
        self.index.push(time);
        self.values.push(value);
        true
    }

    /// Drops every sample older than `cutoff`.
    pub fn retain_from(&mut self, cutoff: NaiveDateTime) {
        let start = self.index.partition_point(|t| *t < cutoff);
        self.index.drain(..start);
        self.values.drain(..start);
    }

    /// Elapsed minutes between sample `i-1` and `i`.
    pub fn elapsed_minutes(&self, i: usize) -> Option<f64> {
        if i == 0 || i >= self.index.len() {
            return None;
        }
        let delta = self.index[i] - self.index[i - 1];
        Some(delta.num_milliseconds() as f64 / 60_000.0)
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}
