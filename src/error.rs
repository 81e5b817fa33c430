//! Planner error type.

use thiserror::Error;

/// Errors surfaced by the planner.
///
/// None of these are fatal to the host app: geometry, scoring and warnings
/// never fail, so the only failures are about the shape of caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// Fewer than two activities were handed to the optimizer.
    #[error("need at least 2 activities to optimize, got {count}")]
    InsufficientActivities { count: usize },
    /// A change id that the optimization result never produced.
    #[error("unknown route change: {0}")]
    UnknownChange(String),
    /// An optimized stop refers to an activity missing from the original list.
    #[error("activity not found in original itinerary: {0}")]
    ActivityNotFound(String),
    /// A change that cannot be placed in the supplied itinerary, e.g. two
    /// approved changes targeting the same position.
    #[error("route change does not fit the itinerary: {0}")]
    InconsistentChange(String),
    /// A clock time that is not in "HH:MM" form.
    #[error("invalid clock time {0:?}, expected HH:MM")]
    InvalidTime(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
