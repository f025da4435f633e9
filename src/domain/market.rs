//! Market: base quote series and the property node registry.
//!
//! The market owns every node of its property graph in a single arena. Base
//! nodes (ask, bid, volume) are created with the market; derived nodes are
//! attached lazily, either explicitly or by parsing a canonical name, and are
//! never removed. Names are unique within a market.
//!
//! Evaluation is pull-based: `update` refreshes a node's parents first and
//! recomputes the node only when one of its parents' series no longer matches
//! the node's own length and last timestamp.

use crate::domain::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::error::TradeError;
use crate::domain::indicator;
use crate::domain::name_codec;
use crate::domain::property::{DEFAULT_BOLLINGER_K, NodeId, PropertyKind, PropertyNode, Role};
use crate::domain::quote::Quote;
use crate::domain::series::TimeSeries;
use chrono::NaiveDateTime;
use std::collections::HashMap;

const ASK: NodeId = NodeId(0);
const BID: NodeId = NodeId(1);
const VOLUME: NodeId = NodeId(2);

/// Default retention budget, in rows.
pub const DEFAULT_MAX_ROWS: usize = 300;

/// Minimum number of rows kept by `clean`.
const MIN_RETAINED_ROWS: usize = 2;

#[derive(Debug, Clone)]
pub struct Market {
    nodes: Vec<PropertyNode>,
    by_name: HashMap<String, NodeId>,
    max_rows: usize,
}

/// One row per timestamp, one column per registered node.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub index: Vec<NaiveDateTime>,
    pub columns: Vec<SnapshotColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Snapshot {
    pub fn column(&self, name: &str) -> Option<&SnapshotColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> usize {
        self.index.len()
    }
}

impl Default for Market {
    fn default() -> Self {
        Self::new()
    }
}

impl Market {
    pub fn new() -> Self {
        Self::with_max_rows(DEFAULT_MAX_ROWS)
    }

    /// `max_rows == 0` disables cleaning.
    pub fn with_max_rows(max_rows: usize) -> Self {
        let mut market = Market {
            nodes: Vec::new(),
            by_name: HashMap::new(),
            max_rows,
        };
        for kind in [PropertyKind::Ask, PropertyKind::Bid, PropertyKind::Volume] {
            let id = NodeId(market.nodes.len());
            let name = kind.token().to_string();
            market.by_name.insert(name.clone(), id);
            market
                .nodes
                .push(PropertyNode::new(id, kind, name, Vec::new()));
        }
        market
    }

    /// Market pre-filled with `quotes`. Samples not strictly after the
    /// previous timestamp are skipped.
    pub fn from_quotes(quotes: &[Quote]) -> Self {
        let mut market = Market::new();
        for quote in quotes {
            market.push_quote(*quote);
        }
        market
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn set_max_rows(&mut self, rows: usize) {
        self.max_rows = rows;
    }

    pub fn ask(&self) -> NodeId {
        ASK
    }

    pub fn bid(&self) -> NodeId {
        BID
    }

    pub fn volume(&self) -> NodeId {
        VOLUME
    }

    /// Node of a base kind, `None` for derived kinds.
    pub fn base(&self, kind: PropertyKind) -> Option<NodeId> {
        match kind {
            PropertyKind::Ask => Some(ASK),
            PropertyKind::Bid => Some(BID),
            PropertyKind::Volume => Some(VOLUME),
            _ => None,
        }
    }

    /// Appends a quote to the three base series. Returns `false` and leaves
    /// the market untouched when `quote.time` is not after the last sample.
    pub fn push_quote(&mut self, quote: Quote) -> bool {
        if let Some(last) = self.nodes[ASK.0].series.index.last() {
            if quote.time <= *last {
                tracing::warn!(time = %quote.time, last = %last, "out of order quote skipped");
                return false;
            }
        }
        self.nodes[ASK.0].series.push(quote.time, Some(quote.ask));
        self.nodes[BID.0].series.push(quote.time, Some(quote.bid));
        self.nodes[VOLUME.0].series.push(quote.time, Some(quote.volume));
        true
    }

    /// Number of rows in the base series.
    pub fn len(&self) -> usize {
        self.nodes[ASK.0].series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn time_index(&self) -> &[NaiveDateTime] {
        &self.nodes[ASK.0].series.index
    }

    pub fn node(&self, id: NodeId) -> &PropertyNode {
        &self.nodes[id.0]
    }

    pub fn series(&self, id: NodeId) -> &TimeSeries {
        &self.nodes[id.0].series
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// All nodes in registration order, base nodes first.
    pub fn nodes(&self) -> impl Iterator<Item = &PropertyNode> {
        self.nodes.iter()
    }

    /// Registers a node of `kind` fed by `parents`, or returns the existing
    /// node with the same canonical name.
    ///
    /// Parents must cover exactly the roles of `kind`; anything else is a
    /// wiring error. A missing window parameter is only a diagnostic.
    pub fn attach(
        &mut self,
        kind: PropertyKind,
        parents: &[(Role, NodeId)],
        diagnostics: &mut Diagnostics,
    ) -> Result<NodeId, TradeError> {
        if let Some(id) = self.base(kind) {
            if !parents.is_empty() {
                return Err(TradeError::RoleMismatch {
                    kind: kind.token().to_string(),
                    reason: "base series take no parents".to_string(),
                });
            }
            return Ok(id);
        }

        let roles = kind.roles();
        let mut ordered = Vec::with_capacity(roles.len());
        for role in roles {
            let mut matching = parents.iter().filter(|(r, _)| r == role);
            match (matching.next(), matching.next()) {
                (Some((_, id)), None) => ordered.push((*role, *id)),
                _ => {
                    return Err(TradeError::RoleMismatch {
                        kind: kind.token().to_string(),
                        reason: format!(
                            "expected exactly one '{}' parent, roles required: {}",
                            role.token(),
                            roles.iter().map(|r| r.token()).collect::<Vec<_>>().join(", ")
                        ),
                    });
                }
            }
        }
        if parents.len() != roles.len() {
            return Err(TradeError::RoleMismatch {
                kind: kind.token().to_string(),
                reason: format!("{} parents given, {} expected", parents.len(), roles.len()),
            });
        }
        if let Some((_, id)) = ordered.iter().find(|(_, id)| id.0 >= self.nodes.len()) {
            return Err(TradeError::UnknownNode {
                name: format!("#{}", id.0),
            });
        }

        let name = {
            let parent_names: Vec<(Role, &str)> = ordered
                .iter()
                .map(|(role, id)| (*role, self.nodes[id.0].name.as_str()))
                .collect();
            name_codec::format_name(kind, &parent_names)
        };
        if let Some(id) = self.by_name.get(&name) {
            return Ok(*id);
        }

        if kind.takes_parameter() && kind.k().is_none() {
            let message = match kind {
                PropertyKind::Bollinger { .. } => format!(
                    "k is not defined for '{}', band width defaults to {}",
                    name, DEFAULT_BOLLINGER_K
                ),
                _ => format!("k is not defined for '{}', values stay undefined", name),
            };
            diagnostics.warn(DiagnosticKind::MissingParameter, message);
        }

        let id = NodeId(self.nodes.len());
        for (_, parent) in &ordered {
            let children = &mut self.nodes[parent.0].children;
            if !children.contains(&id) {
                children.push(id);
            }
        }
        tracing::debug!(node = %name, kind = %kind, "property attached");
        self.nodes
            .push(PropertyNode::new(id, kind, name.clone(), ordered));
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Resolves a canonical name, building the missing part of its subtree.
    /// A name that does not parse is recorded as a diagnostic.
    pub fn resolve(&mut self, name: &str, diagnostics: &mut Diagnostics) -> Option<NodeId> {
        match name_codec::parse(name, self, diagnostics) {
            Ok(id) => Some(id),
            Err(e) => {
                diagnostics.warn(
                    DiagnosticKind::UnresolvedName,
                    format!("cannot resolve '{}': {}", name, e),
                );
                None
            }
        }
    }

    /// Brings a node and its ancestors up to date with the base series.
    pub fn update(&mut self, id: NodeId) {
        let parents: Vec<NodeId> = self.nodes[id.0].parents.iter().map(|(_, p)| *p).collect();
        for parent in parents {
            self.update(parent);
        }
        if !self.is_stale(id) {
            return;
        }
        let mut series = self.compute(id);
        series.name = self.nodes[id.0].name.clone();
        self.nodes[id.0].series = series;
    }

    /// Updates every registered node.
    pub fn analyse(&mut self) {
        for i in 0..self.nodes.len() {
            self.update(NodeId(i));
        }
    }

    pub fn is_stale(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.0];
        let own = node.series.stamp();
        node.parents
            .iter()
            .any(|(_, p)| self.nodes[p.0].series.stamp() != own)
    }

    fn role_series(&self, node: &PropertyNode, role: Role) -> Option<&TimeSeries> {
        node.parent(role).map(|p| &self.nodes[p.0].series)
    }

    fn compute(&self, id: NodeId) -> TimeSeries {
        let node = &self.nodes[id.0];
        let Some(primary) = node
            .kind
            .primary_role()
            .and_then(|role| self.role_series(node, role))
        else {
            return node.series.clone();
        };
        let undefined = || primary.aligned(primary.name.clone(), vec![None; primary.len()]);

        match node.kind {
            PropertyKind::Derivative => indicator::derivative(primary),
            PropertyKind::MovingAverage { k: Some(k) } => indicator::moving_average(primary, k),
            PropertyKind::ExponentialMovingAverage { k: Some(k) } => {
                indicator::exponential_moving_average(primary, k)
            }
            PropertyKind::StdDev { k: Some(k) } => indicator::standard_deviation(primary, k),
            PropertyKind::Variation { k: Some(k) } => indicator::variation(primary, k),
            PropertyKind::Rsi { k: Some(k) } => indicator::rsi(primary, k),
            PropertyKind::Macd { k: Some(k) } => match self.role_series(node, Role::Long) {
                Some(long) => indicator::macd(primary, long, k),
                None => undefined(),
            },
            PropertyKind::Bollinger { k } => {
                match (
                    self.role_series(node, Role::Mean),
                    self.role_series(node, Role::Std),
                ) {
                    (Some(mean), Some(std)) => indicator::bollinger(
                        primary,
                        mean,
                        std,
                        k.unwrap_or(DEFAULT_BOLLINGER_K) as f64,
                    ),
                    _ => undefined(),
                }
            }
            _ => undefined(),
        }
    }

    /// Number of leading undefined rows of a node: the sum of window
    /// warm-ups along its longest parent chain.
    pub fn warmup(&self, id: NodeId) -> usize {
        let node = &self.nodes[id.0];
        let inherited = node
            .parents
            .iter()
            .map(|(_, p)| self.warmup(*p))
            .max()
            .unwrap_or(0);
        let own = match node.kind {
            PropertyKind::Derivative => 1,
            // k is a band multiplier here, not a window
            PropertyKind::Bollinger { .. } => 0,
            kind => kind.k().map(|k| k.saturating_sub(1)).unwrap_or(0),
        };
        inherited.saturating_add(own)
    }

    /// Rows kept by `clean`: enough history for every node to produce its
    /// next value.
    pub fn retention_rows(&self) -> usize {
        let deepest = (0..self.nodes.len())
            .map(|i| self.warmup(NodeId(i)))
            .max()
            .unwrap_or(0);
        deepest.saturating_add(1).max(MIN_RETAINED_ROWS)
    }

    /// Truncates every node to the retention window once the base series
    /// exceed `max_rows`. Returns whether anything was dropped.
    pub fn clean(&mut self) -> bool {
        if self.max_rows == 0 || self.len() <= self.max_rows {
            return false;
        }
        let rows = self.retention_rows();
        if rows >= self.len() {
            return false;
        }
        self.truncate(rows);
        tracing::info!(rows, "market cleaned");
        true
    }

    /// Keeps the last `rows` timestamps of the base series and drops older
    /// samples from every node, so all series stay aligned.
    pub fn truncate(&mut self, rows: usize) {
        let len = self.len();
        if rows >= len {
            return;
        }
        let cutoff = self.nodes[ASK.0].series.index[len - rows];
        for node in &mut self.nodes {
            node.series.retain_from(cutoff);
        }
    }

    /// Ancestors of `id` followed by `id` itself, parents before children.
    pub fn dependencies(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.collect_dependencies(id, &mut order);
        order
    }

    fn collect_dependencies(&self, id: NodeId, order: &mut Vec<NodeId>) {
        if order.contains(&id) {
            return;
        }
        for (_, parent) in &self.nodes[id.0].parents {
            self.collect_dependencies(*parent, order);
        }
        order.push(id);
    }

    /// Tabular view of every registered node, aligned on the base index.
    pub fn snapshot(&self) -> Snapshot {
        let index = self.time_index().to_vec();
        let columns = self
            .nodes
            .iter()
            .map(|node| SnapshotColumn {
                name: node.name.clone(),
                values: if node.kind.is_base() {
                    node.series.values.clone()
                } else {
                    index.iter().map(|t| node.series.value_at(*t)).collect()
                },
            })
            .collect();
        Snapshot { index, columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::minutes(minute as i64)
    }

    fn quote(minute: u32, price: f64) -> Quote {
        Quote {
            time: at(minute),
            ask: price,
            bid: price - 1.0,
            volume: 10.0,
        }
    }

    fn market_with(prices: &[f64]) -> Market {
        let quotes: Vec<Quote> = prices
            .iter()
            .enumerate()
            .map(|(i, p)| quote(i as u32, *p))
            .collect();
        Market::from_quotes(&quotes)
    }

    #[test]
    fn new_market_has_base_nodes() {
        let market = Market::new();
        let names: Vec<&str> = market.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["ask", "bid", "volume"]);
        assert_eq!(market.get("bid"), Some(market.bid()));
        assert!(market.is_empty());
    }

    #[test]
    fn push_quote_appends_to_all_base_series() {
        let mut market = Market::new();
        assert!(market.push_quote(quote(0, 10.0)));
        assert!(market.push_quote(quote(1, 11.0)));
        assert!(!market.push_quote(quote(1, 12.0)));
        assert_eq!(market.len(), 2);
        assert_eq!(market.series(market.bid()).values, vec![Some(9.0), Some(10.0)]);
        assert_eq!(market.series(market.volume()).len(), 2);
    }

    #[test]
    fn attach_dedups_by_name() {
        let mut market = Market::new();
        let mut diags = Diagnostics::new();
        let ask = market.ask();
        let kind = PropertyKind::MovingAverage { k: Some(3) };
        let a = market.attach(kind, &[(Role::Data, ask)], &mut diags).unwrap();
        let b = market.attach(kind, &[(Role::Data, ask)], &mut diags).unwrap();
        assert_eq!(a, b);
        assert_eq!(market.nodes().count(), 4);
        assert_eq!(market.node(ask).children, vec![a]);
    }

    #[test]
    fn attach_rejects_wrong_roles() {
        let mut market = Market::new();
        let mut diags = Diagnostics::new();
        let ask = market.ask();
        let err = market
            .attach(
                PropertyKind::Macd { k: Some(3) },
                &[(Role::Data, ask)],
                &mut diags,
            )
            .unwrap_err();
        assert!(matches!(err, TradeError::RoleMismatch { .. }));

        let err = market
            .attach(
                PropertyKind::Rsi { k: Some(3) },
                &[(Role::Data, ask), (Role::Mean, ask)],
                &mut diags,
            )
            .unwrap_err();
        assert!(matches!(err, TradeError::RoleMismatch { .. }));
    }

    #[test]
    fn attach_rejects_unknown_parent() {
        let mut market = Market::new();
        let mut diags = Diagnostics::new();
        let err = market
            .attach(
                PropertyKind::Derivative,
                &[(Role::Data, NodeId(42))],
                &mut diags,
            )
            .unwrap_err();
        assert!(matches!(err, TradeError::UnknownNode { .. }));
    }

    #[test]
    fn attach_without_parameter_warns() {
        let mut market = Market::new();
        let mut diags = Diagnostics::new();
        let ask = market.ask();
        let id = market
            .attach(PropertyKind::Rsi { k: None }, &[(Role::Data, ask)], &mut diags)
            .unwrap();
        assert_eq!(market.node(id).name, "rsi_ask");
        assert_eq!(diags.count(DiagnosticKind::MissingParameter), 1);
    }

    #[test]
    fn update_computes_moving_average() {
        let mut market = market_with(&[1.0, 2.0, 3.0, 4.0]);
        let mut diags = Diagnostics::new();
        let id = market.resolve("MA_k-2_ask", &mut diags).unwrap();
        market.update(id);
        let series = market.series(id);
        assert_eq!(series.name, "MA_k-2_ask");
        assert_eq!(series.values, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
        assert_eq!(series.index, market.time_index());
    }

    #[test]
    fn update_recomputes_only_when_parent_grows() {
        let mut market = market_with(&[1.0, 2.0, 3.0]);
        let mut diags = Diagnostics::new();
        let id = market.resolve("MA_k-2_ask", &mut diags).unwrap();
        market.update(id);
        assert!(!market.is_stale(id));

        market.push_quote(quote(3, 5.0));
        assert!(market.is_stale(id));
        market.update(id);
        assert!(!market.is_stale(id));
        assert_eq!(market.series(id).last_value(), Some(4.0));
    }

    #[test]
    fn update_chains_through_ancestors() {
        let mut market = market_with(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut diags = Diagnostics::new();
        let id = market.resolve("MA_k-2_MA_k-2_ask", &mut diags).unwrap();
        market.update(id);
        let inner = market.get("MA_k-2_ask").unwrap();
        assert_eq!(market.series(inner).len(), 5);
        assert_eq!(market.series(id).values[1], None);
        assert_eq!(market.series(id).values[2], Some(2.0));
    }

    #[test]
    fn update_without_parameter_stays_undefined() {
        let mut market = market_with(&[1.0, 2.0, 3.0]);
        let mut diags = Diagnostics::new();
        let id = market.resolve("MA_ask", &mut diags).unwrap();
        market.update(id);
        assert_eq!(market.series(id).values, vec![None, None, None]);
    }

    #[test]
    fn update_bollinger_default_band() {
        let mut market = market_with(&[1.0, 3.0, 2.0, 4.0]);
        let mut diags = Diagnostics::new();
        let explicit = market
            .resolve(
                "bollinger_k-2_data_ask_mean_MA_k-3_ask_std_std_k-3_ask",
                &mut diags,
            )
            .unwrap();
        let implicit = market
            .resolve("bollinger_data_ask_mean_MA_k-3_ask_std_std_k-3_ask", &mut diags)
            .unwrap();
        market.analyse();
        assert_ne!(explicit, implicit);
        assert_eq!(market.series(explicit).values, market.series(implicit).values);
        assert!(market.series(explicit).values[3].is_some());
    }

    #[test]
    fn update_macd() {
        let prices: Vec<f64> = (1..=10).map(|i| i as f64 * 10.0).collect();
        let mut market = market_with(&prices);
        let mut diags = Diagnostics::new();
        let id = market
            .resolve("macd_k-2_long_MA_k-4_ask_short_MA_k-2_ask", &mut diags)
            .unwrap();
        market.update(id);
        let series = market.series(id);
        assert_eq!(series.values[3], None);
        assert!(series.values[4].is_some());
        assert!(series.values[9].unwrap() > 0.0);
    }

    #[test]
    fn warmup_sums_along_chain() {
        let mut market = Market::new();
        let mut diags = Diagnostics::new();
        let ma = market.resolve("MA_k-5_ask", &mut diags).unwrap();
        let deriv = market.resolve("deriv_MA_k-5_ask", &mut diags).unwrap();
        let macd = market
            .resolve("macd_k-3_long_MA_k-13_ask_short_MA_k-5_ask", &mut diags)
            .unwrap();
        assert_eq!(market.warmup(market.ask()), 0);
        assert_eq!(market.warmup(ma), 4);
        assert_eq!(market.warmup(deriv), 5);
        assert_eq!(market.warmup(macd), 14);
        assert_eq!(market.retention_rows(), 15);
    }

    #[test]
    fn huge_windows_saturate_retention() {
        let mut market = market_with(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        market.set_max_rows(3);
        let mut diags = Diagnostics::new();
        let name = format!("MA_k-{max}_MA_k-{max}_ask", max = usize::MAX);
        let id = market.resolve(&name, &mut diags).unwrap();

        assert_eq!(market.warmup(id), usize::MAX);
        assert_eq!(market.retention_rows(), usize::MAX);
        market.analyse();
        assert_eq!(market.series(id).values, vec![None; 5]);
        assert!(!market.clean());
        assert_eq!(market.len(), 5);
    }

    #[test]
    fn retention_rows_minimum() {
        assert_eq!(Market::new().retention_rows(), 2);
    }

    #[test]
    fn clean_truncates_all_nodes_in_lockstep() {
        let prices: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut market = market_with(&prices);
        market.set_max_rows(5);
        let mut diags = Diagnostics::new();
        let id = market.resolve("MA_k-3_ask", &mut diags).unwrap();
        market.analyse();

        assert!(market.clean());
        assert_eq!(market.len(), 3);
        assert_eq!(market.series(id).len(), 3);
        assert_eq!(market.series(id).index, market.time_index());
        assert!(!market.is_stale(id));
        assert_relative_eq!(market.series(id).last_value().unwrap(), 8.0);
    }

    #[test]
    fn clean_noop_under_budget() {
        let mut market = market_with(&[1.0, 2.0, 3.0]);
        market.set_max_rows(5);
        assert!(!market.clean());
        market.set_max_rows(0);
        assert!(!market.clean());
        assert_eq!(market.len(), 3);
    }

    #[test]
    fn truncate_then_regrow_recomputes() {
        let mut market = market_with(&[1.0, 2.0, 3.0, 4.0]);
        let mut diags = Diagnostics::new();
        let id = market.resolve("MA_k-2_ask", &mut diags).unwrap();
        // leave the node behind, then truncate and grow back to the same length
        market.truncate(2);
        market.push_quote(quote(4, 5.0));
        market.push_quote(quote(5, 6.0));
        assert_eq!(market.len(), 4);
        assert!(market.is_stale(id));
        market.update(id);
        assert_eq!(market.series(id).last_value(), Some(5.5));
    }

    #[test]
    fn dependencies_parents_first() {
        let mut market = Market::new();
        let mut diags = Diagnostics::new();
        let id = market
            .resolve("macd_k-3_long_MA_k-13_ask_short_MA_k-5_ask", &mut diags)
            .unwrap();
        let names: Vec<&str> = market
            .dependencies(id)
            .into_iter()
            .map(|d| market.node(d).name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "ask",
                "MA_k-13_ask",
                "MA_k-5_ask",
                "macd_k-3_long_MA_k-13_ask_short_MA_k-5_ask"
            ]
        );
    }

    #[test]
    fn resolve_records_unresolved_name() {
        let mut market = Market::new();
        let mut diags = Diagnostics::new();
        assert_eq!(market.resolve("close", &mut diags), None);
        assert!(diags.has(DiagnosticKind::UnresolvedName));
    }

    #[test]
    fn snapshot_has_stable_columns() {
        let mut market = market_with(&[1.0, 2.0, 3.0]);
        let mut diags = Diagnostics::new();
        market.resolve("MA_k-2_ask", &mut diags).unwrap();
        market.resolve("deriv_bid", &mut diags).unwrap();
        market.analyse();
        let snapshot = market.snapshot();
        assert_eq!(
            snapshot.column_names(),
            vec!["ask", "bid", "volume", "MA_k-2_ask", "deriv_bid"]
        );
        assert_eq!(snapshot.rows(), 3);
        assert_eq!(
            snapshot.column("MA_k-2_ask").unwrap().values,
            vec![None, Some(1.5), Some(2.5)]
        );
        assert!(snapshot.column("rsi_k-3_ask").is_none());
    }

    #[test]
    fn snapshot_pads_stale_nodes() {
        let mut market = market_with(&[1.0, 2.0]);
        let mut diags = Diagnostics::new();
        market.resolve("MA_k-1_ask", &mut diags).unwrap();
        market.analyse();
        market.push_quote(quote(2, 3.0));
        let snapshot = market.snapshot();
        assert_eq!(
            snapshot.column("MA_k-1_ask").unwrap().values,
            vec![Some(1.0), Some(2.0), None]
        );
    }
}
