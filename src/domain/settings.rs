//! Typed settings read from a `ConfigPort`.
//!
//! Range problems are hard errors. Individual malformed condition strings
//! are only diagnostics, so one bad rule does not discard the rest.

use crate::domain::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::error::TradeError;
use crate::domain::market::DEFAULT_MAX_ROWS;
use crate::domain::market_tools::DEFAULT_SPLIT_GAP_SECONDS;
use crate::domain::request::{ActionRequest, ConditionRequest, PropertyRequest};
use crate::domain::simulator::SimulationConfig;
use crate::ports::config_port::ConfigPort;

pub const ACTION_SECTION_PREFIX: &str = "action.";

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSettings {
    /// Rows kept before cleaning, 0 disables cleaning.
    pub max_rows: usize,
    pub split_gap_seconds: i64,
}

impl MarketSettings {
    /// Largest gap between quotes of one segment.
    pub fn split_gap(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.split_gap_seconds).unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            split_gap_seconds: DEFAULT_SPLIT_GAP_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub market: MarketSettings,
    pub simulation: SimulationConfig,
    pub properties: Vec<PropertyRequest>,
    pub actions: Vec<ActionRequest>,
}

impl Settings {
    /// Canonical names of the configured properties.
    pub fn property_names(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter_map(|p| p.value.as_deref())
            .collect()
    }
}

pub fn load_settings(
    config: &dyn ConfigPort,
    diagnostics: &mut Diagnostics,
) -> Result<Settings, TradeError> {
    Ok(Settings {
        market: load_market_settings(config)?,
        simulation: load_simulation_config(config)?,
        properties: load_property_requests(config),
        actions: load_action_requests(config, diagnostics),
    })
}

pub fn load_market_settings(config: &dyn ConfigPort) -> Result<MarketSettings, TradeError> {
    let defaults = MarketSettings::default();
    let max_rows = config.get_int("market", "max_rows", defaults.max_rows as i64);
    if max_rows < 0 {
        return Err(TradeError::ConfigInvalid {
            section: "market".to_string(),
            key: "max_rows".to_string(),
            reason: "max_rows must be non-negative".to_string(),
        });
    }
    let split_gap_seconds =
        config.get_int("market", "split_gap_seconds", defaults.split_gap_seconds);
    if split_gap_seconds <= 0 || chrono::Duration::try_seconds(split_gap_seconds).is_none() {
        return Err(TradeError::ConfigInvalid {
            section: "market".to_string(),
            key: "split_gap_seconds".to_string(),
            reason: "split_gap_seconds must be positive and fit a duration".to_string(),
        });
    }
    Ok(MarketSettings {
        max_rows: max_rows as usize,
        split_gap_seconds,
    })
}

pub fn load_simulation_config(config: &dyn ConfigPort) -> Result<SimulationConfig, TradeError> {
    let defaults = SimulationConfig::default();
    let initial_cash = config.get_double("simulation", "initial_cash", defaults.initial_cash);
    if initial_cash <= 0.0 {
        return Err(invalid_simulation("initial_cash", "initial_cash must be positive"));
    }
    let fee_pct = config.get_double("simulation", "fee_pct", defaults.fee_pct);
    if !(0.0..100.0).contains(&fee_pct) {
        return Err(invalid_simulation("fee_pct", "fee_pct must be in [0, 100)"));
    }
    let cost_no_action =
        config.get_double("simulation", "cost_no_action", defaults.cost_no_action);
    if cost_no_action < 0.0 {
        return Err(invalid_simulation(
            "cost_no_action",
            "cost_no_action must be non-negative",
        ));
    }
    let min_trades_per_day =
        config.get_double("simulation", "min_trades_per_day", defaults.min_trades_per_day);
    if min_trades_per_day < 0.0 {
        return Err(invalid_simulation(
            "min_trades_per_day",
            "min_trades_per_day must be non-negative",
        ));
    }
    Ok(SimulationConfig {
        initial_cash,
        fee_pct,
        cost_no_action,
        min_trades_per_day,
    })
}

fn invalid_simulation(key: &str, reason: &str) -> TradeError {
    TradeError::ConfigInvalid {
        section: "simulation".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// `[properties] names` as a comma-separated list of canonical names.
pub fn load_property_requests(config: &dyn ConfigPort) -> Vec<PropertyRequest> {
    config
        .get_string("properties", "names")
        .map(|names| {
            names
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(PropertyRequest::by_name)
                .collect()
        })
        .unwrap_or_default()
}

/// One request per `[action.<id>]` section, sorted by id.
pub fn load_action_requests(
    config: &dyn ConfigPort,
    diagnostics: &mut Diagnostics,
) -> Vec<ActionRequest> {
    let mut sections: Vec<String> = config
        .sections()
        .into_iter()
        .filter(|s| s.starts_with(ACTION_SECTION_PREFIX))
        .collect();
    sections.sort_by(|a, b| action_order(a).cmp(&action_order(b)));
    sections
        .iter()
        .map(|section| ActionRequest {
            kind: config.get_string(section, "type"),
            conditions: config
                .get_string(section, "conditions")
                .map(|text| parse_conditions(&text, diagnostics)),
        })
        .collect()
}

/// Numeric ids first in numeric order, then the rest by name.
fn action_order(section: &str) -> (bool, u64, &str) {
    let id = section.strip_prefix(ACTION_SECTION_PREFIX).unwrap_or(section);
    match id.parse::<u64>() {
        Ok(n) => (false, n, id),
        Err(_) => (true, 0, id),
    }
}

/// Parses `<property> <function> <value>` items separated by commas.
pub fn parse_conditions(text: &str, diagnostics: &mut Diagnostics) -> Vec<ConditionRequest> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            let parts: Vec<&str> = item.split_whitespace().collect();
            match parts.as_slice() {
                [property, function, value] => Some(ConditionRequest {
                    function: Some((*function).to_string()),
                    value: value.parse::<f64>().ok(),
                    property: Some((*property).to_string()),
                }),
                _ => {
                    diagnostics.warn(
                        DiagnosticKind::MalformedRequest,
                        format!(
                            "condition '{}' should read '<property> <function> <value>'",
                            item
                        ),
                    );
                    None
                }
            }
        })
        .collect()
}
