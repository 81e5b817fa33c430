//! Route builder.
//!
//! Walks an ordered itinerary once, asking the travel estimator for each leg
//! and holding stops until they open. This is the only place that decides
//! when a stop happens; everything else rebuilds a route instead of doing its
//! own clock arithmetic.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{
    Activity, Coordinates, Location, TransportMode, TransportPreferences, minute_of_day,
};
use crate::polyline::Polyline;
use crate::traits::TravelEstimator;

/// Segment endpoint id for the start anchor.
pub const START_ID: &str = "start";
/// Segment endpoint id for the end anchor.
pub const END_ID: &str = "end";

/// One activity placed in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub activity: Activity,
    pub arrival_time: NaiveDateTime,
    pub departure_time: NaiveDateTime,
    /// Minutes spent waiting for the place to open.
    pub wait_time: i64,
    /// 0-based position in this route.
    pub order: usize,
    /// 0-based position in the reference route, set when comparing routes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_order: Option<usize>,
    #[serde(default)]
    pub was_reordered: bool,
    /// Arrival difference in minutes against the reference route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delta: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelSegment {
    pub from_activity_id: String,
    pub to_activity_id: String,
    pub mode: TransportMode,
    /// Meters.
    pub distance: f64,
    /// Minutes.
    pub duration: i64,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

/// Immutable snapshot of a simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub stops: Vec<RouteStop>,
    pub segments: Vec<TravelSegment>,
    /// Travel + wait + on-site minutes.
    pub total_duration: i64,
    pub total_travel_time: i64,
    /// Meters.
    pub total_distance: f64,
    pub total_wait_time: i64,
    pub activity_time: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location: Option<Location>,
    #[serde(default)]
    pub is_optimized: bool,
}

impl Route {
    /// Activity ids in visiting order.
    pub fn activity_ids(&self) -> Vec<&str> {
        self.stops.iter().map(|stop| stop.activity.id.as_str()).collect()
    }

    pub fn stop_for(&self, activity_id: &str) -> Option<&RouteStop> {
        self.stops.iter().find(|stop| stop.activity.id == activity_id)
    }

    /// Activities in visiting order.
    pub fn activities(&self) -> Vec<Activity> {
        self.stops.iter().map(|stop| stop.activity.clone()).collect()
    }

    /// Minutes from midnight of the start date to the end of the route.
    ///
    /// Keeps counting past midnight instead of wrapping.
    pub fn end_minute_of_day(&self) -> i64 {
        let midnight = self.start_time.date().and_time(NaiveTime::MIN);
        (self.end_time - midnight).num_minutes()
    }

    /// Visited coordinates: start anchor, stops, end anchor.
    pub fn polyline(&self) -> Polyline {
        let anchors_and_stops = self
            .start_location
            .iter()
            .map(|l| l.coordinates)
            .chain(self.stops.iter().map(|s| s.activity.coordinates()))
            .chain(self.end_location.iter().map(|l| l.coordinates));
        Polyline::from_coordinates(anchors_and_stops)
    }
}

/// Running state of the simulation.
struct Clock {
    now: NaiveDateTime,
    position: Option<(String, Coordinates)>,
    travel: i64,
    distance: f64,
    wait: i64,
    on_site: i64,
}

fn leg<E: TravelEstimator + ?Sized>(
    estimator: &E,
    prefs: &TransportPreferences,
    from: (&str, Coordinates),
    to: (&str, Coordinates),
    departure: NaiveDateTime,
) -> TravelSegment {
    let distance = estimator.distance(from.1, to.1);
    let mode = estimator.select_mode(distance, prefs);
    let duration = estimator.travel_time(from.1, to.1, mode, Some(departure));
    TravelSegment {
        from_activity_id: from.0.to_string(),
        to_activity_id: to.0.to_string(),
        mode,
        distance,
        duration,
        departure_time: departure,
        arrival_time: departure + Duration::minutes(duration),
    }
}

/// Minutes to wait before `activity` opens on the day of `now`.
///
/// Closed days, missing hours and openings on a later day all mean no wait.
fn opening_wait(activity: &Activity, now: NaiveDateTime) -> i64 {
    let Some(hours) = activity.hours_on(now.weekday().num_days_from_sunday()) else {
        return 0;
    };
    if hours.is_closed {
        return 0;
    }
    let opens = now.date().and_time(hours.open);
    if now >= opens {
        return 0;
    }
    let seconds = (opens - now).num_seconds();
    (seconds + 59) / 60
}

/// Simulate visiting `activities` in order, starting at `date`@`start_time`.
pub fn build_route_with<E: TravelEstimator + ?Sized>(
    estimator: &E,
    activities: &[Activity],
    date: NaiveDate,
    start_time: NaiveTime,
    prefs: &TransportPreferences,
    start_location: Option<&Location>,
    end_location: Option<&Location>,
) -> Route {
    let start = date.and_time(start_time);
    let mut clock = Clock {
        now: start,
        position: start_location.map(|l| (START_ID.to_string(), l.coordinates)),
        travel: 0,
        distance: 0.0,
        wait: 0,
        on_site: 0,
    };
    let mut stops = Vec::with_capacity(activities.len());
    let mut segments = Vec::with_capacity(activities.len() + 1);

    for (order, activity) in activities.iter().enumerate() {
        if let Some((from_id, from)) = &clock.position {
            let segment = leg(
                estimator,
                prefs,
                (from_id.as_str(), *from),
                (activity.id.as_str(), activity.coordinates()),
                clock.now,
            );
            clock.now = segment.arrival_time;
            clock.travel += segment.duration;
            clock.distance += segment.distance;
            segments.push(segment);
        }

        let wait_time = opening_wait(activity, clock.now);
        let arrival_time = clock.now + Duration::minutes(wait_time);
        let departure_time = arrival_time + Duration::minutes(activity.duration);

        clock.wait += wait_time;
        clock.on_site += activity.duration;
        clock.now = departure_time;
        clock.position = Some((activity.id.clone(), activity.coordinates()));

        stops.push(RouteStop {
            activity: activity.clone(),
            arrival_time,
            departure_time,
            wait_time,
            order,
            original_order: None,
            was_reordered: false,
            time_delta: None,
        });
    }

    if let (Some(end), Some((from_id, from))) = (end_location, &clock.position) {
        let segment = leg(
            estimator,
            prefs,
            (from_id.as_str(), *from),
            (END_ID, end.coordinates),
            clock.now,
        );
        clock.now = segment.arrival_time;
        clock.travel += segment.duration;
        clock.distance += segment.distance;
        segments.push(segment);
    }

    Route {
        stops,
        segments,
        total_duration: clock.travel + clock.wait + clock.on_site,
        total_travel_time: clock.travel,
        total_distance: clock.distance,
        total_wait_time: clock.wait,
        activity_time: clock.on_site,
        start_time: start,
        end_time: clock.now,
        start_location: start_location.cloned(),
        end_location: end_location.cloned(),
        is_optimized: false,
    }
}

/// Minutes past `day_end` at which the route finishes; negative when it ends
/// early.
pub fn overrun_minutes(route: &Route, day_end: NaiveTime) -> i64 {
    route.end_minute_of_day() - minute_of_day(day_end)
}
