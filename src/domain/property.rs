//! Property graph nodes.
//!
//! A property node derives one `TimeSeries` from its parent nodes through an
//! indicator kernel. Nodes live in the arena owned by a `Market` and refer to
//! their parents and children by `NodeId`, never by reference.

use crate::domain::series::TimeSeries;
use std::fmt;

/// Index of a node in its market's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Role a parent plays for its child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Data,
    Long,
    Short,
    Mean,
    Std,
}

impl Role {
    pub fn token(self) -> &'static str {
        match self {
            Role::Data => "data",
            Role::Long => "long",
            Role::Short => "short",
            Role::Mean => "mean",
            Role::Std => "std",
        }
    }

    pub fn from_token(token: &str) -> Option<Role> {
        match token {
            "data" => Some(Role::Data),
            "long" => Some(Role::Long),
            "short" => Some(Role::Short),
            "mean" => Some(Role::Mean),
            "std" => Some(Role::Std),
            _ => None,
        }
    }
}

/// Node kind with its parameter payload. `k` is the window size; it is
/// optional so that a node missing it still constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Ask,
    Bid,
    Volume,
    Derivative,
    MovingAverage { k: Option<usize> },
    ExponentialMovingAverage { k: Option<usize> },
    StdDev { k: Option<usize> },
    Variation { k: Option<usize> },
    Rsi { k: Option<usize> },
    Macd { k: Option<usize> },
    Bollinger { k: Option<usize> },
}

const NO_ROLES: &[Role] = &[];
const DATA_ROLE: &[Role] = &[Role::Data];
const MACD_ROLES: &[Role] = &[Role::Long, Role::Short];
const BOLLINGER_ROLES: &[Role] = &[Role::Data, Role::Mean, Role::Std];

/// Multiplier used by a Bollinger node built without `k`.
pub const DEFAULT_BOLLINGER_K: usize = 2;

impl PropertyKind {
    pub fn token(&self) -> &'static str {
        match self {
            PropertyKind::Ask => "ask",
            PropertyKind::Bid => "bid",
            PropertyKind::Volume => "volume",
            PropertyKind::Derivative => "deriv",
            PropertyKind::MovingAverage { .. } => "MA",
            PropertyKind::ExponentialMovingAverage { .. } => "EMA",
            PropertyKind::StdDev { .. } => "std",
            PropertyKind::Variation { .. } => "variation",
            PropertyKind::Rsi { .. } => "rsi",
            PropertyKind::Macd { .. } => "macd",
            PropertyKind::Bollinger { .. } => "bollinger",
        }
    }

    /// Kind selected by a leading name token, with no parameter set.
    pub fn from_token(token: &str) -> Option<PropertyKind> {
        let kind = match token {
            "ask" => PropertyKind::Ask,
            "bid" => PropertyKind::Bid,
            "volume" => PropertyKind::Volume,
            "deriv" => PropertyKind::Derivative,
            "MA" => PropertyKind::MovingAverage { k: None },
            "EMA" => PropertyKind::ExponentialMovingAverage { k: None },
            "std" => PropertyKind::StdDev { k: None },
            "variation" => PropertyKind::Variation { k: None },
            "rsi" => PropertyKind::Rsi { k: None },
            "macd" => PropertyKind::Macd { k: None },
            "bollinger" => PropertyKind::Bollinger { k: None },
            _ => return None,
        };
        Some(kind)
    }

    pub fn k(&self) -> Option<usize> {
        match self {
            PropertyKind::MovingAverage { k }
            | PropertyKind::ExponentialMovingAverage { k }
            | PropertyKind::StdDev { k }
            | PropertyKind::Variation { k }
            | PropertyKind::Rsi { k }
            | PropertyKind::Macd { k }
            | PropertyKind::Bollinger { k } => *k,
            PropertyKind::Ask
            | PropertyKind::Bid
            | PropertyKind::Volume
            | PropertyKind::Derivative => None,
        }
    }

    /// Same kind with the window parameter replaced. No-op for kinds
    /// without a parameter.
    pub fn with_k(self, value: Option<usize>) -> PropertyKind {
        match self {
            PropertyKind::MovingAverage { .. } => PropertyKind::MovingAverage { k: value },
            PropertyKind::ExponentialMovingAverage { .. } => {
                PropertyKind::ExponentialMovingAverage { k: value }
            }
            PropertyKind::StdDev { .. } => PropertyKind::StdDev { k: value },
            PropertyKind::Variation { .. } => PropertyKind::Variation { k: value },
            PropertyKind::Rsi { .. } => PropertyKind::Rsi { k: value },
            PropertyKind::Macd { .. } => PropertyKind::Macd { k: value },
            PropertyKind::Bollinger { .. } => PropertyKind::Bollinger { k: value },
            other => other,
        }
    }

    pub fn takes_parameter(&self) -> bool {
        !matches!(
            self,
            PropertyKind::Ask | PropertyKind::Bid | PropertyKind::Volume | PropertyKind::Derivative
        )
    }

    pub fn is_base(&self) -> bool {
        matches!(
            self,
            PropertyKind::Ask | PropertyKind::Bid | PropertyKind::Volume
        )
    }

    /// Parent roles in canonical name order.
    pub fn roles(&self) -> &'static [Role] {
        match self {
            PropertyKind::Ask | PropertyKind::Bid | PropertyKind::Volume => NO_ROLES,
            PropertyKind::Macd { .. } => MACD_ROLES,
            PropertyKind::Bollinger { .. } => BOLLINGER_ROLES,
            _ => DATA_ROLE,
        }
    }

    /// Role whose series drives the node's index.
    pub fn primary_role(&self) -> Option<Role> {
        match self {
            PropertyKind::Ask | PropertyKind::Bid | PropertyKind::Volume => None,
            PropertyKind::Macd { .. } => Some(Role::Short),
            _ => Some(Role::Data),
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.k() {
            Some(k) => write!(f, "{}(k={})", self.token(), k),
            None => f.write_str(self.token()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyNode {
    pub id: NodeId,
    pub kind: PropertyKind,
    pub name: String,
    /// Parents in canonical role order.
    pub parents: Vec<(Role, NodeId)>,
    pub children: Vec<NodeId>,
    pub series: TimeSeries,
}

impl PropertyNode {
    pub fn new(id: NodeId, kind: PropertyKind, name: String, parents: Vec<(Role, NodeId)>) -> Self {
        let series = TimeSeries::new(name.clone());
        Self {
            id,
            kind,
            name,
            parents,
            children: Vec::new(),
            series,
        }
    }

    pub fn parent(&self, role: Role) -> Option<NodeId> {
        self.parents
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, id)| *id)
    }
}
