//! Static points of interest for the map screen
//!
//! Shelters, hospitals, police stations and known danger zones around the
//! reference area, with a filterable kind.

use crate::location::Coordinate;

/// Kind of a point on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceKind {
    Shelter,
    Hospital,
    Police,
    Danger,
}

impl PlaceKind {
    pub fn label(&self) -> &'static str {
        match self {
            PlaceKind::Shelter => "Shelter",
            PlaceKind::Hospital => "Hospital",
            PlaceKind::Police => "Police",
            PlaceKind::Danger => "Danger zone",
        }
    }
}

/// A point of interest
#[derive(Debug, Clone, Copy)]
pub struct Place {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: PlaceKind,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Centre of the static dataset, used when no position has been resolved
pub const REFERENCE_POINT: Coordinate = Coordinate {
    latitude: 40.7128,
    longitude: -74.006,
};

/// Static list of points of interest
pub static PLACES: [Place; 5] = [
    Place {
        id: "central-shelter",
        name: "Central Emergency Shelter",
        kind: PlaceKind::Shelter,
        latitude: 40.7128,
        longitude: -74.006,
    },
    Place {
        id: "city-hospital",
        name: "City Hospital",
        kind: PlaceKind::Hospital,
        latitude: 40.715,
        longitude: -74.009,
    },
    Place {
        id: "police-12",
        name: "Police Station #12",
        kind: PlaceKind::Police,
        latitude: 40.711,
        longitude: -74.003,
    },
    Place {
        id: "flood-zone-a",
        name: "Flood Zone A",
        kind: PlaceKind::Danger,
        latitude: 40.718,
        longitude: -74.001,
    },
    Place {
        id: "community-center",
        name: "Community Center",
        kind: PlaceKind::Shelter,
        latitude: 40.708,
        longitude: -74.012,
    },
];

/// Returns all points of interest
pub fn all_places() -> &'static [Place] {
    &PLACES
}

/// Points matching `kind`, or all of them for `None`, in dataset order
pub fn places_of_kind(kind: Option<PlaceKind>) -> Vec<&'static Place> {
    PLACES
        .iter()
        .filter(|p| kind.map_or(true, |k| p.kind == k))
        .collect()
}
