//! Real Paris locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    /// Slug used as activity id.
    pub fn id(&self) -> String {
        self.name
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    pub fn to_location(&self) -> trip_planner::Location {
        trip_planner::Location::named(self.name, self.lat, self.lng)
    }
}

// ============================================================================
// Sights
// ============================================================================

pub const SIGHTS: &[Location] = &[
    Location::new("Eiffel Tower", 48.8584, 2.2945),
    Location::new("Louvre", 48.8606, 2.3376),
    Location::new("Notre Dame", 48.8530, 2.3499),
    Location::new("Sacre Coeur", 48.8867, 2.3431),
    Location::new("Musee d'Orsay", 48.8600, 2.3266),
    Location::new("Arc de Triomphe", 48.8738, 2.2950),
    Location::new("Pantheon", 48.8462, 2.3464),
    Location::new("Centre Pompidou", 48.8607, 2.3522),
    Location::new("Sainte Chapelle", 48.8554, 2.3450),
    Location::new("Jardin du Luxembourg", 48.8462, 2.3372),
    Location::new("Palais Garnier", 48.8720, 2.3316),
    Location::new("Musee Rodin", 48.8553, 2.3159),
];

// ============================================================================
// Restaurants
// ============================================================================

pub const RESTAURANTS: &[Location] = &[
    Location::new("Le Comptoir du Relais", 48.8522, 2.3388),
    Location::new("Chez Janou", 48.8581, 2.3659),
    Location::new("Bouillon Chartier", 48.8720, 2.3437),
    Location::new("Le Train Bleu", 48.8447, 2.3735),
    Location::new("L'As du Fallafel", 48.8574, 2.3590),
];

// ============================================================================
// Hotels (good for start/end anchors)
// ============================================================================

pub const HOTELS: &[Location] = &[
    Location::new("Hotel du Louvre", 48.8626, 2.3361),
    Location::new("Hotel Lutetia", 48.8510, 2.3270),
];

pub fn place(name: &str) -> &'static Location {
    SIGHTS
        .iter()
        .chain(RESTAURANTS)
        .chain(HOTELS)
        .find(|l| l.name == name)
        .unwrap_or_else(|| panic!("unknown fixture location {name}"))
}
