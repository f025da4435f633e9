//! Domain error types.

/// A canonical-name parse error. `position` is the index of the offending
/// `_`-separated token.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("name parse error at token {position}: {message}")]
pub struct NameParseError {
    pub message: String,
    pub position: usize,
}

impl NameParseError {
    /// Format the error with a caret under the offending token of `name`.
    pub fn display_with_context(&self, name: &str) -> String {
        let offset: usize = name
            .split('_')
            .take(self.position)
            .map(|token| token.len() + 1)
            .sum();
        let caret = " ".repeat(offset) + "^";
        format!("{name}\n{caret}\n{err}", name = name, caret = caret, err = self)
    }
}

/// Top-level error type for quotetrader.
#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    NameParse(#[from] NameParseError),

    #[error("cannot wire {kind} node: {reason}")]
    RoleMismatch { kind: String, reason: String },

    #[error("unknown node: {name}")]
    UnknownNode { name: String },

    #[error("data load error: {reason}")]
    DataLoad { reason: String },

    #[error("snapshot write error: {reason}")]
    Snapshot { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradeError> for std::process::ExitCode {
    fn from(err: &TradeError) -> Self {
        let code: u8 = match err {
            TradeError::Io(_) | TradeError::Snapshot { .. } => 1,
            TradeError::ConfigParse { .. }
            | TradeError::ConfigMissing { .. }
            | TradeError::ConfigInvalid { .. } => 2,
            TradeError::DataLoad { .. } => 3,
            TradeError::NameParse(_)
            | TradeError::RoleMismatch { .. }
            | TradeError::UnknownNode { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
