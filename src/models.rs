//! Plain data records exchanged with the host app.
//!
//! Everything here is serde-friendly: clock times travel as "HH:MM" strings,
//! timestamps as ISO-8601 local date-times.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Parse a "HH:MM" clock time.
pub fn parse_clock(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| PlannerError::InvalidTime(value.to_string()))
}

/// Minutes since midnight for a clock time.
pub fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Serde adapter for `NaiveTime` as "HH:MM".
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_clock(&raw).map_err(serde::de::Error::custom)
    }
}

/// Latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A place on the map with an optional label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Coordinates::new(latitude, longitude),
            name: None,
            address: None,
        }
    }

    pub fn named(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(latitude, longitude)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flexibility {
    Fixed,
    #[default]
    Flexible,
}

/// Inclusive clock window, e.g. a preferred visit slot or a meal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse a window from two "HH:MM" strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_clock(start)?, parse_clock(end)?))
    }

    /// Midpoint in minutes since midnight.
    pub fn midpoint_minutes(&self) -> i64 {
        (minute_of_day(self.start) + minute_of_day(self.end)) / 2
    }
}

/// Opening hours for one weekday. `day_of_week` counts from Sunday = 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub day_of_week: u32,
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
    #[serde(default)]
    pub is_closed: bool,
}

/// A planned stop supplied by the caller.
///
/// The planner only ever reorders activities; it never creates, drops or
/// edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub location: Location,
    /// Minutes spent on site.
    pub duration: i64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub flexibility: Flexibility,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_time_window: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operating_hours: Vec<OperatingHours>,
}

impl Activity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: Location,
        duration: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            location,
            duration,
            priority: 0,
            flexibility: Flexibility::Flexible,
            is_locked: false,
            preferred_time_window: None,
            scheduled_time: None,
            reservation_time: None,
            operating_hours: Vec::new(),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        self.location.coordinates
    }

    /// Fixed flexibility or an explicit lock keeps an activity out of the
    /// reordering heuristics.
    pub fn is_pinned(&self) -> bool {
        self.flexibility == Flexibility::Fixed || self.is_locked
    }

    /// Reservation, falling back to the scheduled slot.
    pub fn booked_time(&self) -> Option<NaiveDateTime> {
        self.reservation_time.or(self.scheduled_time)
    }

    /// Clock time used to splice activities around fixed bookings: the
    /// booking when there is one, else the preferred window start.
    pub fn anchor_clock(&self) -> Option<NaiveTime> {
        self.booked_time()
            .map(|t| t.time())
            .or_else(|| self.preferred_time_window.map(|w| w.start))
    }

    /// Opening hours for a weekday (Sunday = 0), if any were supplied.
    pub fn hours_on(&self, day_of_week: u32) -> Option<&OperatingHours> {
        self.operating_hours.iter().find(|h| h.day_of_week == day_of_week)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Walking,
    Cycling,
    Driving,
    Transit,
    Rideshare,
    Taxi,
}

impl TransportMode {
    pub const ALL: [TransportMode; 6] = [
        TransportMode::Walking,
        TransportMode::Cycling,
        TransportMode::Driving,
        TransportMode::Transit,
        TransportMode::Rideshare,
        TransportMode::Taxi,
    ];

    /// Road modes that get caught in rush hour.
    pub fn is_road(self) -> bool {
        matches!(self, TransportMode::Driving | TransportMode::Rideshare | TransportMode::Taxi)
    }

    /// Modes eligible as the long-distance fallback in mode selection.
    pub fn is_motorized(self) -> bool {
        self.is_road() || self == TransportMode::Transit
    }
}

/// How the traveller is willing to get around.
///
/// The order of `modes` is the precedence used when picking a long-distance
/// mode. The accessibility flags are carried for a future router and not
/// consumed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportPreferences {
    pub modes: Vec<TransportMode>,
    /// Meters.
    pub max_walking_distance: f64,
    /// Minutes.
    pub max_walking_duration: i64,
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
    pub wheelchair_accessible: bool,
}

impl Default for TransportPreferences {
    fn default() -> Self {
        Self {
            modes: vec![TransportMode::Walking, TransportMode::Transit],
            max_walking_distance: 1500.0,
            max_walking_duration: 20,
            avoid_highways: false,
            avoid_tolls: false,
            wheelchair_accessible: false,
        }
    }
}

impl TransportPreferences {
    pub fn allows(&self, mode: TransportMode) -> bool {
        self.modes.contains(&mode)
    }
}

/// Day bounds and meal windows for an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConstraints {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch_window: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner_window: Option<TimeWindow>,
}

impl OptimizationConstraints {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
            lunch_window: None,
            dinner_window: None,
        }
    }

    /// Length of the planning day in minutes; zero or negative for
    /// degenerate bounds.
    pub fn day_minutes(&self) -> i64 {
        minute_of_day(self.end_time) - minute_of_day(self.start_time)
    }
}
