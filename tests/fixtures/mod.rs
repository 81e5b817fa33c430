//! Test fixtures for trip-planner.
//!
//! Provides realistic test data including:
//! - Real Paris sights, restaurants and hotels (from OpenStreetMap)
//! - A builder for test activities with sensible defaults

pub mod paris_locations;

pub use paris_locations::*;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use trip_planner::{Activity, Flexibility, OperatingHours, TimeWindow};

/// A Wednesday.
pub fn trip_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
}

pub fn clock(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

pub fn on_trip_day(h: u32, m: u32) -> NaiveDateTime {
    trip_date().and_time(clock(h, m))
}

/// Builder for test activities with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestActivity(Activity);

impl TestActivity {
    pub fn new(id: &str) -> Self {
        Self(Activity::new(id, id, trip_planner::Location::new(0.0, 0.0), 30))
    }

    pub fn at(place: &Location) -> Self {
        Self(Activity::new(place.id(), place.name, place.to_location(), 60))
    }

    pub fn location(mut self, lat: f64, lng: f64) -> Self {
        self.0.location = trip_planner::Location::new(lat, lng);
        self
    }

    pub fn duration(mut self, minutes: i64) -> Self {
        self.0.duration = minutes;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.0.priority = priority;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.0.category = category.to_string();
        self
    }

    pub fn fixed(mut self) -> Self {
        self.0.flexibility = Flexibility::Fixed;
        self
    }

    pub fn locked(mut self) -> Self {
        self.0.is_locked = true;
        self
    }

    pub fn reserved_at(mut self, h: u32, m: u32) -> Self {
        self.0.reservation_time = Some(on_trip_day(h, m));
        self
    }

    pub fn preferred(mut self, start: (u32, u32), end: (u32, u32)) -> Self {
        let window = TimeWindow::new(clock(start.0, start.1), clock(end.0, end.1));
        self.0.preferred_time_window = Some(window);
        self
    }

    /// Opening hours for the trip day.
    pub fn opens(mut self, h: u32, m: u32) -> Self {
        self.0.operating_hours.push(OperatingHours {
            day_of_week: 3,
            open: clock(h, m),
            close: clock(22, 0),
            is_closed: false,
        });
        self
    }

    pub fn build(self) -> Activity {
        self.0
    }
}

pub fn ids(activities: &[Activity]) -> Vec<&str> {
    activities.iter().map(|a| a.id.as_str()).collect()
}
