//! Comprehensive optimizer tests
//!
//! Tests for strategies, pinned activities, savings, changes and warnings.

mod fixtures;

use trip_planner::solver::WarningKind;
use trip_planner::{
    Activity, OptimizationConstraints, OptimizationResult, OptimizationStrategy, Planner,
    PlannerError, TransportPreferences, optimize_route,
};

use fixtures::{TestActivity, clock, ids, trip_date};

// ============================================================================
// Helper Functions
// ============================================================================

fn constraints() -> OptimizationConstraints {
    OptimizationConstraints::new(clock(9, 0), clock(21, 0))
}

fn optimize(activities: &[Activity], strategy: OptimizationStrategy) -> OptimizationResult {
    optimize_route(
        activities,
        trip_date(),
        strategy,
        &TransportPreferences::default(),
        &constraints(),
        None,
        None,
    )
    .expect("enough activities")
}

fn optimized_ids(result: &OptimizationResult) -> Vec<&str> {
    result.optimized_route.activity_ids()
}

fn sorted(mut ids: Vec<&str>) -> Vec<&str> {
    ids.sort();
    ids
}

/// Three stops on the equator, ~1.1 km apart.
fn line_of_three() -> Vec<Activity> {
    vec![
        TestActivity::new("a").location(0.0, 0.0).priority(1).build(),
        TestActivity::new("b").location(0.0, 0.01).priority(3).build(),
        TestActivity::new("c").location(0.0, 0.02).priority(2).build(),
    ]
}

// ============================================================================
// Input Validation
// ============================================================================

#[test]
fn test_needs_two_activities() {
    let none: Vec<Activity> = Vec::new();
    let one = vec![TestActivity::new("a").build()];
    for activities in [&none[..], &one[..]] {
        let result = optimize_route(
            activities,
            trip_date(),
            OptimizationStrategy::Balanced,
            &TransportPreferences::default(),
            &constraints(),
            None,
            None,
        );
        assert_eq!(
            result,
            Err(PlannerError::InsufficientActivities {
                count: activities.len()
            })
        );
    }
}

// ============================================================================
// Strategy Tests
// ============================================================================

#[test]
fn test_every_strategy_returns_permutation() {
    let activities = vec![
        TestActivity::new("a").location(0.0, 0.03).build(),
        TestActivity::new("b").location(0.0, 0.0).locked().build(),
        TestActivity::new("c").location(0.01, 0.02).fixed().reserved_at(13, 0).build(),
        TestActivity::new("d").location(0.0, 0.01).category("dining").build(),
        TestActivity::new("e").location(0.02, 0.0).build(),
    ];
    for strategy in OptimizationStrategy::ALL {
        let result = optimize(&activities, strategy);
        assert_eq!(
            sorted(optimized_ids(&result)),
            vec!["a", "b", "c", "d", "e"],
            "{} must keep every activity exactly once",
            strategy.as_str()
        );
        assert_eq!(result.strategy, strategy);
        assert!(result.optimized_route.is_optimized);
        assert!(!result.original_route.is_optimized);
    }
}

#[test]
fn test_minimize_distance_not_worse_than_input() {
    let activities = vec![
        TestActivity::new("a").location(0.0, 0.0).build(),
        TestActivity::new("b").location(0.015, 0.03).build(),
        TestActivity::new("c").location(0.01, 0.005).build(),
    ];
    let result = optimize(&activities, OptimizationStrategy::MinimizeDistance);
    assert!(result.optimized_route.total_distance <= result.original_route.total_distance + 1e-6);
    assert_eq!(optimized_ids(&result), vec!["a", "c", "b"]);
}

#[test]
fn test_minimize_travel_follows_start_anchor() {
    let activities = line_of_three();
    let start = trip_planner::Location::new(0.0, 0.025);
    let result = optimize_route(
        &activities,
        trip_date(),
        OptimizationStrategy::MinimizeTravel,
        &TransportPreferences::default(),
        &constraints(),
        Some(&start),
        None,
    )
    .expect("enough activities");
    assert_eq!(optimized_ids(&result), vec!["c", "b", "a"]);
    assert_eq!(result.optimized_route.segments[0].from_activity_id, "start");
}

#[test]
fn test_priority_first_orders_by_priority() {
    let result = optimize(&line_of_three(), OptimizationStrategy::PriorityFirst);
    assert_eq!(optimized_ids(&result), vec!["b", "c", "a"]);
}

#[test]
fn test_chronological_orders_by_window() {
    let activities = vec![
        TestActivity::new("dinner").preferred((19, 0), (21, 0)).build(),
        TestActivity::new("anytime").build(),
        TestActivity::new("museum").preferred((10, 0), (12, 0)).build(),
    ];
    let result = optimize(&activities, OptimizationStrategy::Chronological);
    assert_eq!(optimized_ids(&result), vec!["museum", "anytime", "dinner"]);
}

#[test]
fn test_balanced_without_meals_matches_minimize_distance() {
    let activities = vec![
        TestActivity::new("a").location(0.0, 0.0).build(),
        TestActivity::new("b").location(0.02, 0.02).build(),
        TestActivity::new("c").location(0.0, 0.02).build(),
        TestActivity::new("d").location(0.02, 0.0).build(),
    ];
    let balanced = optimize(&activities, OptimizationStrategy::Balanced);
    let distance = optimize(&activities, OptimizationStrategy::MinimizeDistance);
    assert_eq!(optimized_ids(&balanced), optimized_ids(&distance));
}

// ============================================================================
// Pinned Activity Tests
// ============================================================================

#[test]
fn test_locked_booking_goes_after_earlier_activities() {
    let activities = vec![
        TestActivity::new("lunch").location(0.0, 0.05).locked().reserved_at(12, 30).build(),
        TestActivity::new("free").location(0.0, 0.02).build(),
        TestActivity::new("afternoon").location(0.0, 0.01).preferred((15, 0), (17, 0)).build(),
        TestActivity::new("morning").location(0.0, 0.0).preferred((9, 0), (11, 0)).build(),
    ];
    let result = optimize(&activities, OptimizationStrategy::MinimizeTravel);
    assert_eq!(optimized_ids(&result), vec!["free", "afternoon", "morning", "lunch"]);
}

#[test]
fn test_fixed_without_booking_moves_to_end() {
    let activities = vec![
        TestActivity::new("tour").location(0.0, 0.0).fixed().build(),
        TestActivity::new("a").location(0.0, 0.01).build(),
        TestActivity::new("b").location(0.0, 0.02).build(),
    ];
    let result = optimize(&activities, OptimizationStrategy::MinimizeDistance);
    assert_eq!(optimized_ids(&result), vec!["a", "b", "tour"]);
}

// ============================================================================
// Savings & Change Tests
// ============================================================================

#[test]
fn test_savings_never_negative_when_strategy_is_worse() {
    let result = optimize(&line_of_three(), OptimizationStrategy::PriorityFirst);
    assert!(result.optimized_route.total_distance > result.original_route.total_distance);
    assert_eq!(result.time_saved, 0);
    assert_eq!(result.distance_saved, 0.0);
}

#[test]
fn test_savings_reported_when_route_improves() {
    let activities = vec![
        TestActivity::new("a").location(0.0, 0.0).build(),
        TestActivity::new("c").location(0.0, 0.04).build(),
        TestActivity::new("b").location(0.0, 0.02).build(),
        TestActivity::new("d").location(0.0, 0.06).build(),
    ];
    let result = optimize(&activities, OptimizationStrategy::MinimizeDistance);
    assert_eq!(optimized_ids(&result), vec!["a", "b", "c", "d"]);
    assert!(result.distance_saved > 0.0);
    assert!(result.time_saved > 0);
    assert_eq!(
        result.time_saved,
        result.original_route.total_travel_time - result.optimized_route.total_travel_time
    );
}

#[test]
fn test_changes_match_positions() {
    let input = line_of_three();
    let result = optimize(&input, OptimizationStrategy::PriorityFirst);
    let optimized = optimized_ids(&result);
    let original = ids(&input);

    assert_eq!(result.changes.len(), 3);
    for change in &result.changes {
        let from = original.iter().position(|id| *id == change.activity_id).expect("in input");
        let to = optimized.iter().position(|id| *id == change.activity_id).expect("in output");
        assert_eq!(change.from_position, from + 1);
        assert_eq!(change.to_position, to + 1);
        assert_ne!(change.from_position, change.to_position);
    }

    let b = result.changes.iter().find(|c| c.activity_id == "b").expect("b moved");
    assert_eq!(b.reason, "Moved earlier to reduce travel time");
    let a = result.changes.iter().find(|c| c.activity_id == "a").expect("a moved");
    assert_eq!(a.reason, "Moved later to optimize route flow");
    assert!(a.time_delta.is_some_and(|d| d > 0));
    assert!(a.impact.ends_with("later"));
}

#[test]
fn test_unmoved_stops_have_no_change() {
    let activities = vec![
        TestActivity::new("a").location(0.0, 0.0).build(),
        TestActivity::new("b").location(0.0, 0.01).build(),
        TestActivity::new("c").location(0.0, 0.02).build(),
    ];
    let result = optimize(&activities, OptimizationStrategy::MinimizeDistance);
    assert!(result.changes.is_empty());
    assert_eq!(result.time_saved, 0);
    for stop in &result.optimized_route.stops {
        assert_eq!(stop.original_order, Some(stop.order));
        assert!(!stop.was_reordered);
        assert_eq!(stop.time_delta, None);
    }
}

// ============================================================================
// Score & Warning Tests
// ============================================================================

#[test]
fn test_scores_within_bounds() {
    let result = optimize(&line_of_three(), OptimizationStrategy::Balanced);
    assert!(result.score <= 100);
    assert!(result.original_score <= 100);
}

#[test]
fn test_long_leg_warns_on_optimized_route() {
    // ~50 km apart: transit, well over 45 minutes
    let activities = vec![
        TestActivity::new("near").location(0.0, 0.0).build(),
        TestActivity::new("far").location(0.0, 0.45).build(),
    ];
    let result = optimize(&activities, OptimizationStrategy::Balanced);
    let long_travel: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::LongTravel)
        .collect();
    assert_eq!(long_travel.len(), 1);
    assert!(long_travel[0].message.contains("111 minutes"));
}

#[test]
fn test_overrun_warning_when_day_is_too_long() {
    let activities = vec![
        TestActivity::new("a").duration(400).build(),
        TestActivity::new("b").duration(400).build(),
    ];
    let result = optimize(&activities, OptimizationStrategy::Balanced);
    assert!(result.warnings.iter().any(|w| w.kind == WarningKind::ExceedsDay));
}

// ============================================================================
// Strategy Comparison
// ============================================================================

#[test]
fn test_compare_strategies_sorted_by_score() {
    let activities = vec![
        TestActivity::new("a").location(0.0, 0.0).build(),
        TestActivity::new("c").location(0.0, 0.2).priority(5).build(),
        TestActivity::new("b").location(0.0, 0.1).build(),
        TestActivity::new("d").location(0.0, 0.3).build(),
    ];
    let results = Planner::default()
        .compare_strategies(
            &activities,
            trip_date(),
            &TransportPreferences::default(),
            &constraints(),
            None,
            None,
        )
        .expect("enough activities");

    assert_eq!(results.len(), OptimizationStrategy::ALL.len());
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    for strategy in OptimizationStrategy::ALL {
        assert!(results.iter().any(|r| r.strategy == strategy));
    }
}
