//! Derivative indicator.
//!
//! DERIV[i] = (X[i] - X[i-1]) / elapsed_minutes(i) / X[i] * 100
//! The first point is undefined (no prior sample).

use super::finite;
use crate::domain::series::TimeSeries;

pub fn derivative(data: &TimeSeries) -> TimeSeries {
    let mut values = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        let value = match (i.checked_sub(1).and_then(|p| data.get(p)), data.get(i)) {
            (Some(prev), Some(curr)) => data
                .elapsed_minutes(i)
                .and_then(|minutes| finite((curr - prev) / minutes / curr * 100.0)),
            _ => None,
        };
        values.push(value);
    }
    data.aligned(data.name.clone(), values)
}
