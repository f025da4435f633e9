//! Canonical property names.
//!
//! Grammar: `kind[_k-<int>](_<role>_<subname>)*`
//!
//! A name is the kind token, the optional `k-<int>` parameter token, then the
//! names of the parents. Single-parent kinds write their parent name directly;
//! multi-parent kinds prefix each parent with its role token, in canonical
//! role order:
//!
//! - `MA_k-13_ask`
//! - `macd_k-5_long_MA_k-13_ask_short_MA_k-7_ask`
//! - `bollinger_k-2_data_ask_mean_MA_k-10_ask_std_std_k-10_ask`
//!
//! Parsing is recursive descent over the `_`-separated tokens. Every kind has
//! a fixed arity, so the nesting is unambiguous even though `std` is both a
//! kind and a role token. Parent sub-names resolve to existing nodes of the
//! market when present, otherwise new nodes are attached.

use crate::domain::diagnostics::Diagnostics;
use crate::domain::error::NameParseError;
use crate::domain::market::Market;
use crate::domain::property::{NodeId, PropertyKind, Role};

pub const SEPARATOR: char = '_';
const PARAMETER_PREFIX: &str = "k-";

/// Builds the canonical name of a node from its kind and parent names.
/// `parents` must already be in canonical role order.
pub fn format_name(kind: PropertyKind, parents: &[(Role, &str)]) -> String {
    let mut tokens: Vec<String> = vec![kind.token().to_string()];
    if let Some(k) = kind.k() {
        tokens.push(format!("{}{}", PARAMETER_PREFIX, k));
    }
    let with_roles = parents.len() > 1;
    for (role, name) in parents {
        if with_roles {
            tokens.push(role.token().to_string());
        }
        tokens.push((*name).to_string());
    }
    tokens.join(&SEPARATOR.to_string())
}

/// Parses `name` into a node of `market`, constructing and registering any
/// missing node of the subtree.
///
/// The whole name is parsed before anything is attached, so a name that
/// fails leaves the market untouched.
pub fn parse(
    name: &str,
    market: &mut Market,
    diagnostics: &mut Diagnostics,
) -> Result<NodeId, NameParseError> {
    if let Some(id) = market.get(name) {
        return Ok(id);
    }
    let mut parser = NameParser::new(name);
    let tree = parser.parse_node()?;
    if let Some(token) = parser.peek() {
        return Err(NameParseError {
            message: format!("unexpected token '{}' after complete name", token),
            position: parser.pos,
        });
    }
    build(&tree, market, diagnostics)
}

/// Syntax tree of a name, before any node exists.
struct NameTree {
    kind: PropertyKind,
    start: usize,
    parents: Vec<(Role, NameTree)>,
}

fn build(
    tree: &NameTree,
    market: &mut Market,
    diagnostics: &mut Diagnostics,
) -> Result<NodeId, NameParseError> {
    if let Some(id) = market.base(tree.kind) {
        return Ok(id);
    }
    let mut parents = Vec::with_capacity(tree.parents.len());
    for (role, parent) in &tree.parents {
        parents.push((*role, build(parent, market, diagnostics)?));
    }
    market
        .attach(tree.kind, &parents, diagnostics)
        .map_err(|e| NameParseError {
            message: e.to_string(),
            position: tree.start,
        })
}

struct NameParser<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> NameParser<'a> {
    fn new(name: &'a str) -> Self {
        let tokens = if name.is_empty() {
            Vec::new()
        } else {
            name.split(SEPARATOR).collect()
        };
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn error(&self, position: usize, message: String) -> NameParseError {
        NameParseError { message, position }
    }

    fn parse_node(&mut self) -> Result<NameTree, NameParseError> {
        let start = self.pos;
        let token = self
            .advance()
            .ok_or_else(|| self.error(start, "expected property kind, found end of name".into()))?;
        let kind = PropertyKind::from_token(token)
            .ok_or_else(|| self.error(start, format!("unknown property kind '{}'", token)))?;

        if kind.is_base() {
            return Ok(NameTree {
                kind,
                start,
                parents: Vec::new(),
            });
        }

        let kind = kind.with_k(self.parse_parameter(kind)?);
        let roles = kind.roles();
        let mut parents: Vec<(Role, NameTree)> = Vec::with_capacity(roles.len());

        if roles.len() == 1 {
            parents.push((roles[0], self.parse_node()?));
        } else {
            for _ in 0..roles.len() {
                let role_pos = self.pos;
                let role = self
                    .advance()
                    .and_then(Role::from_token)
                    .filter(|r| roles.contains(r) && !parents.iter().any(|(p, _)| p == r))
                    .ok_or_else(|| {
                        let expected: Vec<&str> = roles
                            .iter()
                            .filter(|r| !parents.iter().any(|(p, _)| p == *r))
                            .map(|r| r.token())
                            .collect();
                        self.error(
                            role_pos,
                            format!(
                                "expected role ({}) for '{}', found '{}'",
                                expected.join(", "),
                                kind.token(),
                                self.tokens.get(role_pos).copied().unwrap_or("end of name")
                            ),
                        )
                    })?;
                parents.push((role, self.parse_node()?));
            }
            parents.sort_by_key(|(role, _)| roles.iter().position(|r| r == role));
        }

        Ok(NameTree {
            kind,
            start,
            parents,
        })
    }

    fn parse_parameter(&mut self, kind: PropertyKind) -> Result<Option<usize>, NameParseError> {
        let Some(token) = self.peek() else {
            return Ok(None);
        };
        let Some(raw) = token.strip_prefix(PARAMETER_PREFIX) else {
            return Ok(None);
        };
        if !kind.takes_parameter() {
            return Err(self.error(
                self.pos,
                format!("'{}' takes no parameter, found '{}'", kind.token(), token),
            ));
        }
        let k = raw.parse::<usize>().map_err(|_| {
            self.error(self.pos, format!("invalid integer parameter '{}'", token))
        })?;
        self.pos += 1;
        Ok(Some(k))
    }
}
