//! Seams of the planner.
//!
//! Kept small on purpose: a travel model the route builder asks for legs, and
//! one reordering heuristic per optimization strategy.

use chrono::NaiveDateTime;

use crate::models::{
    Activity, Coordinates, Location, OptimizationConstraints, TransportMode, TransportPreferences,
};

/// Estimates distance and travel time between two points.
///
/// The default implementation is great-circle based; a road or transit router
/// could stand in later without touching the route builder.
pub trait TravelEstimator {
    /// Distance in meters.
    fn distance(&self, from: Coordinates, to: Coordinates) -> f64;

    /// Travel time in whole minutes, departing at `departure` when known.
    fn travel_time(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: TransportMode,
        departure: Option<NaiveDateTime>,
    ) -> i64;

    /// Pick a mode for a leg of `distance` meters.
    fn select_mode(&self, distance: f64, prefs: &TransportPreferences) -> TransportMode;
}

/// Everything a reordering heuristic may look at besides the activities.
pub struct ReorderContext<'a, E: TravelEstimator + ?Sized> {
    pub estimator: &'a E,
    pub constraints: &'a OptimizationConstraints,
    pub start_location: Option<&'a Location>,
}

/// Reorders the flexible subset of an itinerary.
///
/// Implementations must return a permutation of their input.
pub trait ReorderStrategy<E: TravelEstimator + ?Sized> {
    fn reorder(&self, flexible: Vec<Activity>, ctx: &ReorderContext<'_, E>) -> Vec<Activity>;
}
