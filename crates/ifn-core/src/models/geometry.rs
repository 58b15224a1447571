use serde::{Deserialize, Serialize};
use std::fmt;

use super::unit::{Badge, UnitId};

/// WGS 84 latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Format with a fixed number of decimals, "lat, lon"
    pub fn format(&self, decimals: usize) -> String {
        format!("{:.*}, {:.*}", decimals, self.latitude, decimals, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(6))
    }
}

/// Map camera position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: Coordinates, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

/// Identifies one viewport animation so its completion can be matched to
/// the selection that started it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationTicket(pub u64);

/// Map marker for one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub unit_id: UnitId,
    pub label: String,
    pub position: Coordinates,
    pub badge: Badge,
    pub highlighted: bool,
}

/// Informational popup anchored at a unit's coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub unit_id: UnitId,
    pub anchor: Coordinates,
    pub title: String,
    pub lines: Vec<String>,
}
