//! Snapshot persistence port trait.

use crate::domain::error::TradeError;
use crate::domain::market::Snapshot;

pub trait SnapshotPort {
    /// Persists `snapshot`, merging with rows already stored. Returns the
    /// number of rows written.
    fn save(&self, snapshot: &Snapshot) -> Result<usize, TradeError>;
}
