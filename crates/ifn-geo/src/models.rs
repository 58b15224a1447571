//! Geometry models for ifn-geo.
//!
//! This module re-exports canonical types from `ifn-core` and provides
//! the conversion to the `geo` crate.

use geo::Point;

// Re-export canonical types from ifn-core
pub use ifn_core::models::{AnimationTicket, Coordinates, Marker, Overlay, Viewport};

/// Convert coordinates to a `geo::Point` (x = longitude, y = latitude)
pub fn to_point(coordinates: &Coordinates) -> Point<f64> {
    Point::new(coordinates.longitude, coordinates.latitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_order() {
        let bogota = Coordinates::new(4.711, -74.0721);
        let point = to_point(&bogota);

        assert_eq!(point.x(), -74.0721);
        assert_eq!(point.y(), 4.711);
    }
}
