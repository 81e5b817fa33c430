//! Itinerary optimizer.
//!
//! Splits an itinerary into pinned and flexible activities, reorders the
//! flexible ones with the chosen heuristic, splices the pinned ones back, and
//! compares the rebuilt day against the original.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::changes::{
    AppliedPlan, ApprovalSession, RouteChange, apply_approved_changes_with, compare_routes,
};
use crate::error::{PlannerError, Result};
use crate::haversine::{EstimatorConfig, HaversineEstimator};
use crate::models::{Activity, Location, OptimizationConstraints, TransportPreferences};
use crate::schedule::{Route, build_route_with, overrun_minutes};
use crate::strategies::{MealPlacement, OptimizationStrategy, merge_fixed, reorderer};
use crate::traits::{ReorderContext, TravelEstimator};

/// Thresholds for route warnings, in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningThresholds {
    pub long_travel: i64,
    pub long_wait: i64,
}

impl Default for WarningThresholds {
    fn default() -> Self {
        Self {
            long_travel: 45,
            long_wait: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerOptions {
    pub estimator: EstimatorConfig,
    pub warnings: WarningThresholds,
    pub meals: MealPlacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    LongTravel,
    ExceedsDay,
    LongWait,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteWarning {
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
}

/// What the review screen gets back from one optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub original_route: Route,
    pub optimized_route: Route,
    pub strategy: OptimizationStrategy,
    /// Travel minutes saved, never negative.
    pub time_saved: i64,
    /// Meters saved, never negative.
    pub distance_saved: f64,
    pub changes: Vec<RouteChange>,
    pub score: u8,
    pub original_score: u8,
    pub warnings: Vec<RouteWarning>,
    /// Start of the planned day; results carry no wall-clock time.
    pub timestamp: NaiveDateTime,
}

/// Score a route out of 100.
///
/// Travel beyond a fifth of the day costs a point per percent; waiting costs
/// half a point per percent. Days of zero or negative length are treated as
/// one minute long.
pub fn calculate_score(route: &Route, constraints: &OptimizationConstraints) -> u8 {
    let day = constraints.day_minutes().max(1) as f64;
    let mut score = 100.0;

    let travel_ratio = route.total_travel_time as f64 / day;
    if travel_ratio > 0.2 {
        score -= (travel_ratio - 0.2) * 100.0;
    }
    let wait_ratio = route.total_wait_time as f64 / day;
    score -= wait_ratio * 50.0;

    score.clamp(0.0, 100.0).round() as u8
}

pub fn generate_warnings(
    route: &Route,
    constraints: &OptimizationConstraints,
    thresholds: &WarningThresholds,
) -> Vec<RouteWarning> {
    let mut warnings = Vec::new();

    for segment in &route.segments {
        if segment.duration > thresholds.long_travel {
            warnings.push(RouteWarning {
                kind: WarningKind::LongTravel,
                severity: Severity::Medium,
                message: format!(
                    "Long travel time: {} minutes between {} and {}",
                    segment.duration, segment.from_activity_id, segment.to_activity_id
                ),
                activity_id: None,
            });
        }
    }

    let overrun = overrun_minutes(route, constraints.end_time);
    if overrun > 0 {
        warnings.push(RouteWarning {
            kind: WarningKind::ExceedsDay,
            severity: Severity::Medium,
            message: format!(
                "Itinerary runs {overrun} minutes past {}",
                constraints.end_time.format("%H:%M")
            ),
            activity_id: None,
        });
    }

    for stop in &route.stops {
        if stop.wait_time > thresholds.long_wait {
            warnings.push(RouteWarning {
                kind: WarningKind::LongWait,
                severity: Severity::Low,
                message: format!(
                    "{} minutes waiting for {} to open",
                    stop.wait_time, stop.activity.name
                ),
                activity_id: Some(stop.activity.id.clone()),
            });
        }
    }

    warnings
}

/// Route builder and optimizer bound to one travel model and option set.
///
/// Holds no per-itinerary state, so one planner can serve any number of
/// concurrent optimizations.
#[derive(Debug, Clone)]
pub struct Planner<E = HaversineEstimator> {
    estimator: E,
    options: PlannerOptions,
}

impl Default for Planner<HaversineEstimator> {
    fn default() -> Self {
        Self::new(PlannerOptions::default())
    }
}

impl Planner<HaversineEstimator> {
    pub fn new(options: PlannerOptions) -> Self {
        Self {
            estimator: HaversineEstimator::new(options.estimator.clone()),
            options,
        }
    }
}

impl<E: TravelEstimator> Planner<E> {
    /// Use a different travel model. `options.estimator` is ignored.
    pub fn with_estimator(estimator: E, options: PlannerOptions) -> Self {
        Self { estimator, options }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    #[instrument(skip_all, fields(activities = activities.len()))]
    pub fn build_route(
        &self,
        activities: &[Activity],
        date: NaiveDate,
        start_time: NaiveTime,
        prefs: &TransportPreferences,
        start_location: Option<&Location>,
        end_location: Option<&Location>,
    ) -> Route {
        build_route_with(
            &self.estimator,
            activities,
            date,
            start_time,
            prefs,
            start_location,
            end_location,
        )
    }

    /// Reorder `activities` under `strategy` and diff the result against the
    /// given order.
    ///
    /// The day starts at `constraints.start_time`. Fewer than two activities
    /// is reported as [`PlannerError::InsufficientActivities`].
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip_all, fields(activities = activities.len(), strategy = strategy.as_str()))]
    pub fn optimize_route(
        &self,
        activities: &[Activity],
        date: NaiveDate,
        strategy: OptimizationStrategy,
        prefs: &TransportPreferences,
        constraints: &OptimizationConstraints,
        start_location: Option<&Location>,
        end_location: Option<&Location>,
    ) -> Result<OptimizationResult> {
        if activities.len() < 2 {
            return Err(PlannerError::InsufficientActivities {
                count: activities.len(),
            });
        }

        let original_route = self.build_route(
            activities,
            date,
            constraints.start_time,
            prefs,
            start_location,
            end_location,
        );

        let (fixed, flexible): (Vec<Activity>, Vec<Activity>) =
            activities.iter().cloned().partition(Activity::is_pinned);
        debug!(fixed = fixed.len(), flexible = flexible.len(), "partitioned itinerary");

        let ctx = ReorderContext {
            estimator: &self.estimator,
            constraints,
            start_location,
        };
        let reordered = reorderer::<E>(strategy, &self.options.meals).reorder(flexible, &ctx);
        debug!(
            order = ?reordered.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            "reordered flexible activities"
        );
        let optimized_order = merge_fixed(reordered, fixed);

        let mut optimized_route = self.build_route(
            &optimized_order,
            date,
            constraints.start_time,
            prefs,
            start_location,
            end_location,
        );
        optimized_route.is_optimized = true;

        let changes = compare_routes(&original_route, &mut optimized_route);
        let time_saved =
            (original_route.total_travel_time - optimized_route.total_travel_time).max(0);
        let distance_saved =
            (original_route.total_distance - optimized_route.total_distance).max(0.0);
        let score = calculate_score(&optimized_route, constraints);
        let original_score = calculate_score(&original_route, constraints);
        let warnings = generate_warnings(&optimized_route, constraints, &self.options.warnings);

        if score < original_score {
            warn!(score, original_score, "optimized route scores below the original");
        }
        info!(
            score,
            time_saved,
            distance_saved,
            changes = changes.len(),
            warnings = warnings.len(),
            "optimized itinerary"
        );

        Ok(OptimizationResult {
            timestamp: original_route.start_time,
            original_route,
            optimized_route,
            strategy,
            time_saved,
            distance_saved,
            changes,
            score,
            original_score,
            warnings,
        })
    }

    /// Run every strategy over the same itinerary, best score first.
    ///
    /// Ties keep the declaration order of [`OptimizationStrategy::ALL`].
    pub fn compare_strategies(
        &self,
        activities: &[Activity],
        date: NaiveDate,
        prefs: &TransportPreferences,
        constraints: &OptimizationConstraints,
        start_location: Option<&Location>,
        end_location: Option<&Location>,
    ) -> Result<Vec<OptimizationResult>>
    where
        E: Sync,
    {
        let mut results = OptimizationStrategy::ALL
            .par_iter()
            .map(|&strategy| {
                self.optimize_route(
                    activities,
                    date,
                    strategy,
                    prefs,
                    constraints,
                    start_location,
                    end_location,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        results.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(results)
    }

    /// Apply a finished review; see [`apply_approved_changes_with`].
    pub fn apply_approved_changes(
        &self,
        result: OptimizationResult,
        session: ApprovalSession,
        original: &[Activity],
        prefs: &TransportPreferences,
    ) -> Result<AppliedPlan> {
        apply_approved_changes_with(&self.estimator, result, session, original, prefs)
    }
}

/// [`Planner::build_route`] with default options.
pub fn build_route(
    activities: &[Activity],
    date: NaiveDate,
    start_time: NaiveTime,
    prefs: &TransportPreferences,
    start_location: Option<&Location>,
    end_location: Option<&Location>,
) -> Route {
    Planner::default().build_route(
        activities,
        date,
        start_time,
        prefs,
        start_location,
        end_location,
    )
}

/// [`Planner::optimize_route`] with default options.
#[allow(clippy::too_many_arguments)]
pub fn optimize_route(
    activities: &[Activity],
    date: NaiveDate,
    strategy: OptimizationStrategy,
    prefs: &TransportPreferences,
    constraints: &OptimizationConstraints,
    start_location: Option<&Location>,
    end_location: Option<&Location>,
) -> Result<OptimizationResult> {
    Planner::default().optimize_route(
        activities,
        date,
        strategy,
        prefs,
        constraints,
        start_location,
        end_location,
    )
}

/// [`Planner::apply_approved_changes`] with default options.
pub fn apply_approved_changes(
    result: OptimizationResult,
    session: ApprovalSession,
    original: &[Activity],
    prefs: &TransportPreferences,
) -> Result<AppliedPlan> {
    Planner::default().apply_approved_changes(result, session, original, prefs)
}
