//! Reordering heuristics for the flexible part of an itinerary.
//!
//! Every heuristic only ever sees flexible activities. Fixed and locked ones
//! are spliced back afterwards by [`merge_fixed`].

use std::cmp::Reverse;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Activity, Coordinates, OptimizationConstraints, minute_of_day};
use crate::traits::{ReorderContext, ReorderStrategy, TravelEstimator};

/// Strategy tag chosen by the traveller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStrategy {
    MinimizeTravel,
    MinimizeDistance,
    PriorityFirst,
    Chronological,
    #[default]
    Balanced,
}

impl OptimizationStrategy {
    pub const ALL: [OptimizationStrategy; 5] = [
        OptimizationStrategy::MinimizeTravel,
        OptimizationStrategy::MinimizeDistance,
        OptimizationStrategy::PriorityFirst,
        OptimizationStrategy::Chronological,
        OptimizationStrategy::Balanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptimizationStrategy::MinimizeTravel => "minimize_travel",
            OptimizationStrategy::MinimizeDistance => "minimize_distance",
            OptimizationStrategy::PriorityFirst => "priority_first",
            OptimizationStrategy::Chronological => "chronological",
            OptimizationStrategy::Balanced => "balanced",
        }
    }
}

/// Knobs for the meal placement step of the balanced strategy.
///
/// Placement uses a crude clock (`day_anchor + index * slot_minutes`), not the
/// simulated schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealPlacement {
    #[serde(with = "crate::models::hhmm")]
    pub day_anchor: NaiveTime,
    pub slot_minutes: i64,
    pub dining_category: String,
}

impl Default for MealPlacement {
    fn default() -> Self {
        Self {
            day_anchor: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_minutes: 90,
            dining_category: "dining".to_string(),
        }
    }
}

/// Greedy nearest-neighbor tour from `start`, or from the first activity when
/// there is no start anchor.
pub fn nearest_neighbor<E: TravelEstimator + ?Sized>(
    activities: Vec<Activity>,
    start: Option<Coordinates>,
    estimator: &E,
) -> Vec<Activity> {
    let mut remaining = activities;
    let mut ordered = Vec::with_capacity(remaining.len());
    let Some(first) = remaining.first() else {
        return ordered;
    };
    let mut current = start.unwrap_or_else(|| first.coordinates());

    while !remaining.is_empty() {
        let nearest = remaining
            .iter()
            .enumerate()
            .map(|(index, activity)| (index, estimator.distance(current, activity.coordinates())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(0, |(index, _)| index);
        let picked = remaining.remove(nearest);
        current = picked.coordinates();
        ordered.push(picked);
    }

    ordered
}

/// 2-opt improvement on an open path, run to a fixed point.
///
/// Reverses `route[i+1..=j]` whenever that strictly shortens the two edges it
/// replaces. Swaps that would move a locked activity or change its neighbours
/// are skipped. Returns the number of accepted swaps.
pub fn two_opt<E: TravelEstimator + ?Sized>(route: &mut [Activity], estimator: &E) -> usize {
    let n = route.len();
    if n < 3 {
        return 0;
    }
    let d = |a: &Activity, b: &Activity| estimator.distance(a.coordinates(), b.coordinates());

    let mut swaps = 0;
    let mut passes = 0;
    let mut improved = true;
    while improved {
        improved = false;
        passes += 1;
        for i in 0..n - 2 {
            for j in i + 2..n {
                let touched_end = (j + 1).min(n - 1);
                if route[i..=touched_end].iter().any(|a| a.is_locked) {
                    continue;
                }
                let (old, new) = if j + 1 < n {
                    (
                        d(&route[i], &route[i + 1]) + d(&route[j], &route[j + 1]),
                        d(&route[i], &route[j]) + d(&route[i + 1], &route[j + 1]),
                    )
                } else {
                    (d(&route[i], &route[i + 1]), d(&route[i], &route[j]))
                };
                if new < old - 1e-9 {
                    route[i + 1..=j].reverse();
                    swaps += 1;
                    improved = true;
                }
            }
        }
    }

    debug!(stops = n, passes, swaps, "2-opt converged");
    swaps
}

/// Move the first dining activity to the slot closest to each meal window.
///
/// Lunch is handled before dinner, so a lone dining activity ends up at the
/// dinner slot when both windows are set. Slots are estimated as
/// `day_anchor + index * slot_minutes`, not from the built schedule.
pub fn place_meals(
    order: &mut Vec<Activity>,
    constraints: &OptimizationConstraints,
    meals: &MealPlacement,
) {
    let anchor = minute_of_day(meals.day_anchor);

    for window in [constraints.lunch_window, constraints.dinner_window].into_iter().flatten() {
        let Some(index) = order.iter().position(|a| a.category == meals.dining_category) else {
            continue;
        };
        let meal = order.remove(index);
        let target = window.midpoint_minutes();
        let slot = (0..=order.len())
            .min_by_key(|&slot| (anchor + slot as i64 * meals.slot_minutes - target).abs())
            .unwrap_or(0);
        debug!(activity = %meal.id, from = index, to = slot, "placed meal");
        order.insert(slot, meal);
    }
}

/// Splice fixed and locked activities back into a reordered flexible list.
///
/// An activity without a booking goes to the end. A booked one goes right
/// after the last activity whose own clock is not later than the booking, or
/// to the front if none is. No feasibility check is made.
pub fn merge_fixed(flexible: Vec<Activity>, fixed: Vec<Activity>) -> Vec<Activity> {
    let mut merged = flexible;
    for activity in fixed {
        let Some(target) = activity.booked_time().map(|t| t.time()) else {
            merged.push(activity);
            continue;
        };
        let at = merged
            .iter()
            .rposition(|a| a.anchor_clock().is_some_and(|clock| clock <= target))
            .map_or(0, |index| index + 1);
        debug!(activity = %activity.id, at, "merged fixed activity");
        merged.insert(at, activity);
    }
    merged
}

pub struct MinimizeTravel;

impl<E: TravelEstimator + ?Sized> ReorderStrategy<E> for MinimizeTravel {
    fn reorder(&self, flexible: Vec<Activity>, ctx: &ReorderContext<'_, E>) -> Vec<Activity> {
        nearest_neighbor(flexible, ctx.start_location.map(|l| l.coordinates), ctx.estimator)
    }
}

pub struct MinimizeDistance;

impl<E: TravelEstimator + ?Sized> ReorderStrategy<E> for MinimizeDistance {
    fn reorder(&self, flexible: Vec<Activity>, ctx: &ReorderContext<'_, E>) -> Vec<Activity> {
        let start = ctx.start_location.map(|l| l.coordinates);
        let mut order = nearest_neighbor(flexible, start, ctx.estimator);
        two_opt(&mut order, ctx.estimator);
        order
    }
}

pub struct PriorityFirst;

impl<E: TravelEstimator + ?Sized> ReorderStrategy<E> for PriorityFirst {
    fn reorder(&self, mut flexible: Vec<Activity>, _ctx: &ReorderContext<'_, E>) -> Vec<Activity> {
        flexible.sort_by_key(|a| Reverse(a.priority));
        flexible
    }
}

pub struct Chronological;

impl<E: TravelEstimator + ?Sized> ReorderStrategy<E> for Chronological {
    fn reorder(&self, mut flexible: Vec<Activity>, _ctx: &ReorderContext<'_, E>) -> Vec<Activity> {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        flexible.sort_by_key(|a| a.preferred_time_window.map_or(noon, |w| w.start));
        flexible
    }
}

pub struct Balanced<'a> {
    pub meals: &'a MealPlacement,
}

impl<E: TravelEstimator + ?Sized> ReorderStrategy<E> for Balanced<'_> {
    fn reorder(&self, flexible: Vec<Activity>, ctx: &ReorderContext<'_, E>) -> Vec<Activity> {
        let start = ctx.start_location.map(|l| l.coordinates);
        let mut order = nearest_neighbor(flexible, start, ctx.estimator);
        place_meals(&mut order, ctx.constraints, self.meals);
        two_opt(&mut order, ctx.estimator);
        order
    }
}

/// Heuristic implementing `strategy`.
pub fn reorderer<'a, E: TravelEstimator + ?Sized>(
    strategy: OptimizationStrategy,
    meals: &'a MealPlacement,
) -> Box<dyn ReorderStrategy<E> + 'a> {
    match strategy {
        OptimizationStrategy::MinimizeTravel => Box::new(MinimizeTravel),
        OptimizationStrategy::MinimizeDistance => Box::new(MinimizeDistance),
        OptimizationStrategy::PriorityFirst => Box::new(PriorityFirst),
        OptimizationStrategy::Chronological => Box::new(Chronological),
        OptimizationStrategy::Balanced => Box::new(Balanced { meals }),
    }
}
