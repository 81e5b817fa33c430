//! trip-planner core
//!
//! Multi-stop itinerary optimization: travel estimation, day simulation,
//! reordering heuristics and a reviewable change protocol. Plain data in,
//! plain data out; no I/O.

pub mod changes;
pub mod error;
pub mod haversine;
pub mod models;
pub mod polyline;
pub mod schedule;
pub mod solver;
pub mod strategies;
pub mod traits;

pub use changes::{AppliedPlan, ApprovalSession, ApprovalStatus, RouteChange, SessionStatus};
pub use error::{PlannerError, Result};
pub use models::{
    Activity, Coordinates, Flexibility, Location, OperatingHours, OptimizationConstraints,
    TimeWindow, TransportMode, TransportPreferences,
};
pub use schedule::{Route, RouteStop, TravelSegment};
pub use solver::{
    OptimizationResult, Planner, PlannerOptions, apply_approved_changes, build_route,
    optimize_route,
};
pub use strategies::OptimizationStrategy;
