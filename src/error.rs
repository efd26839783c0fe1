//! Expected misses during navigation.
//!
//! None of these reach the user. Operations that hit one log it at `trace`
//! level and leave the visible state unchanged.

use thiserror::Error;

use crate::geometry::WindowId;
use crate::layout::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavMiss {
    /// The id vanished in a resync since it was last observed.
    #[error("window {0} is no longer tracked")]
    StaleReference(WindowId),

    #[error("no windows are tracked")]
    EmptyRegistry,

    #[error("no thumbnail lies {0}")]
    NoDirectionalCandidate(Direction),
}
