//! Great-circle travel estimator.
//!
//! Uses haversine distance and a fixed average speed per transport mode.
//! Ignores the road network and live traffic; a static rush-hour factor and
//! a transit access buffer are the only adjustments.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::{Coordinates, TransportMode, TransportPreferences};
use crate::traits::TravelEstimator;

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Average speeds per mode, km/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeSpeeds {
    pub walking: f64,
    pub cycling: f64,
    pub driving: f64,
    pub transit: f64,
    pub rideshare: f64,
    pub taxi: f64,
}

impl Default for ModeSpeeds {
    fn default() -> Self {
        Self {
            walking: 5.0,
            cycling: 15.0,
            driving: 40.0,
            transit: 30.0,
            rideshare: 35.0,
            taxi: 35.0,
        }
    }
}

impl ModeSpeeds {
    pub fn speed_kmh(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Walking => self.walking,
            TransportMode::Cycling => self.cycling,
            TransportMode::Driving => self.driving,
            TransportMode::Transit => self.transit,
            TransportMode::Rideshare => self.rideshare,
            TransportMode::Taxi => self.taxi,
        }
    }
}

/// Tunables for [`HaversineEstimator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub speeds: ModeSpeeds,
    /// Factor applied to road modes departing inside a rush window.
    pub rush_hour_multiplier: f64,
    /// Inclusive (first hour, last hour) pairs.
    pub rush_hours: Vec<(u32, u32)>,
    /// Minutes added to every transit leg for getting to and from stops.
    pub transit_buffer_minutes: i64,
    /// Legs up to this many meters may be cycled.
    pub max_cycling_distance: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            speeds: ModeSpeeds::default(),
            rush_hour_multiplier: 1.5,
            rush_hours: vec![(7, 9), (17, 19)],
            transit_buffer_minutes: 10,
            max_cycling_distance: 5_000.0,
        }
    }
}

/// Haversine-based travel estimator.
#[derive(Debug, Clone, Default)]
pub struct HaversineEstimator {
    pub config: EstimatorConfig,
}

impl HaversineEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Great-circle distance in meters.
    pub fn haversine_m(from: Coordinates, to: Coordinates) -> f64 {
        let lat1_rad = from.latitude.to_radians();
        let lat2_rad = to.latitude.to_radians();
        let delta_lat = (to.latitude - from.latitude).to_radians();
        let delta_lng = (to.longitude - from.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_M * c
    }

    fn is_rush_hour(&self, departure: NaiveDateTime) -> bool {
        let hour = departure.hour();
        self.config
            .rush_hours
            .iter()
            .any(|&(first, last)| hour >= first && hour <= last)
    }
}

impl TravelEstimator for HaversineEstimator {
    fn distance(&self, from: Coordinates, to: Coordinates) -> f64 {
        Self::haversine_m(from, to)
    }

    fn travel_time(
        &self,
        from: Coordinates,
        to: Coordinates,
        mode: TransportMode,
        departure: Option<NaiveDateTime>,
    ) -> i64 {
        let meters = Self::haversine_m(from, to);
        if meters <= 0.0 || !meters.is_finite() {
            return 0;
        }

        let speed = self.config.speeds.speed_kmh(mode);
        let mut minutes = (meters / 1000.0 / speed * 60.0).ceil();

        if mode.is_road() && departure.is_some_and(|at| self.is_rush_hour(at)) {
            minutes = (minutes * self.config.rush_hour_multiplier).ceil();
        }

        let mut minutes = minutes as i64;
        if mode == TransportMode::Transit {
            minutes += self.config.transit_buffer_minutes;
        }

        minutes.max(1)
    }

    fn select_mode(&self, distance: f64, prefs: &TransportPreferences) -> TransportMode {
        if distance <= prefs.max_walking_distance && prefs.allows(TransportMode::Walking) {
            return TransportMode::Walking;
        }
        if distance <= self.config.max_cycling_distance && prefs.allows(TransportMode::Cycling) {
            return TransportMode::Cycling;
        }
        prefs
            .modes
            .iter()
            .copied()
            .find(|mode| mode.is_motorized())
            .unwrap_or(TransportMode::Transit)
    }
}

/// Great-circle distance in meters.
pub fn distance(from: Coordinates, to: Coordinates) -> f64 {
    HaversineEstimator::haversine_m(from, to)
}

/// Travel time in minutes with the default estimator settings.
pub fn travel_time(
    from: Coordinates,
    to: Coordinates,
    mode: TransportMode,
    departure: Option<NaiveDateTime>,
) -> i64 {
    HaversineEstimator::default().travel_time(from, to, mode, departure)
}

/// Mode choice with the default estimator settings.
pub fn select_mode(distance: f64, prefs: &TransportPreferences) -> TransportMode {
    HaversineEstimator::default().select_mode(distance, prefs)
}
