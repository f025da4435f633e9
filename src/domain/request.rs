//! Request records and their translation into rule-layer objects.
//!
//! Requests come from configuration and may be incomplete. Every builder
//! rejects a bad item by recording a diagnostic and returning `None`; the
//! batch builders skip it and carry on with the rest.

use crate::domain::condition::{Condition, ConditionOperator};
use crate::domain::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::market::Market;
use crate::domain::order::{Action, Order, Polarity};
use crate::domain::property::NodeId;

/// Only `format = "name"` is understood.
pub const NAME_FORMAT: &str = "name";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyRequest {
    pub format: Option<String>,
    pub value: Option<String>,
}

impl PropertyRequest {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            format: Some(NAME_FORMAT.to_string()),
            value: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionRequest {
    pub function: Option<String>,
    pub value: Option<f64>,
    pub property: Option<String>,
}

impl ConditionRequest {
    pub fn new(property: impl Into<String>, function: impl Into<String>, value: f64) -> Self {
        Self {
            function: Some(function.into()),
            value: Some(value),
            property: Some(property.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionRequest {
    pub kind: Option<String>,
    pub conditions: Option<Vec<ConditionRequest>>,
}

impl ActionRequest {
    pub fn new(kind: impl Into<String>, conditions: Vec<ConditionRequest>) -> Self {
        Self {
            kind: Some(kind.into()),
            conditions: Some(conditions),
        }
    }
}

pub fn build_property(
    request: &PropertyRequest,
    market: &mut Market,
    diagnostics: &mut Diagnostics,
) -> Option<NodeId> {
    let (Some(format), Some(value)) = (&request.format, &request.value) else {
        diagnostics.warn(
            DiagnosticKind::MalformedRequest,
            "property request needs 'format' and 'value'",
        );
        return None;
    };
    if format != NAME_FORMAT {
        diagnostics.warn(
            DiagnosticKind::MalformedRequest,
            format!("unsupported property format '{}'", format),
        );
        return None;
    }
    market.resolve(value, diagnostics)
}

pub fn build_properties(
    requests: &[PropertyRequest],
    market: &mut Market,
    diagnostics: &mut Diagnostics,
) -> Vec<NodeId> {
    requests
        .iter()
        .filter_map(|r| build_property(r, market, diagnostics))
        .collect()
}

pub fn build_condition(
    request: &ConditionRequest,
    market: &mut Market,
    diagnostics: &mut Diagnostics,
) -> Option<Condition> {
    let (Some(function), Some(value), Some(property)) =
        (&request.function, request.value, &request.property)
    else {
        diagnostics.warn(
            DiagnosticKind::MalformedRequest,
            "condition request needs 'function', 'value' and 'property'",
        );
        return None;
    };
    let Some(operator) = ConditionOperator::from_symbol(function) else {
        diagnostics.warn(
            DiagnosticKind::UnknownOperator,
            format!("unknown condition function '{}'", function),
        );
        return None;
    };
    let id = market.resolve(property, diagnostics)?;
    Some(Condition::new(id, operator, value))
}

pub fn build_action(
    request: &ActionRequest,
    market: &mut Market,
    diagnostics: &mut Diagnostics,
) -> Option<Action> {
    let (Some(kind), Some(conditions)) = (&request.kind, &request.conditions) else {
        diagnostics.warn(
            DiagnosticKind::MalformedRequest,
            "action request needs 'type' and 'conditions'",
        );
        return None;
    };
    let Some(polarity) = Polarity::from_token(kind) else {
        diagnostics.warn(
            DiagnosticKind::UnknownActionType,
            format!("unknown action type '{}'", kind),
        );
        return None;
    };
    let mut action = Action::new(polarity);
    for condition in conditions {
        if let Some(c) = build_condition(condition, market, diagnostics) {
            action.push(c);
        }
    }
    if action.conditions.is_empty() {
        diagnostics.warn(
            DiagnosticKind::EmptyAction,
            format!("{} action has no valid condition and never fires", polarity),
        );
    }
    Some(action)
}

pub fn build_order(
    requests: &[ActionRequest],
    market: &mut Market,
    diagnostics: &mut Diagnostics,
) -> Order {
    let actions = requests
        .iter()
        .filter_map(|r| build_action(r, market, diagnostics))
        .collect();
    Order::with_actions(actions)
}
