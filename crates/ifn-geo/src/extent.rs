use geo::{coord, Intersects, Rect};

use crate::models::{to_point, Coordinates, Viewport};
use crate::validation::validate_coordinates;

/// Geographic center used for the initial map view
const NATIONAL_CENTER: Coordinates = Coordinates { latitude: 4.5709, longitude: -74.2973 };

/// Zoom level that shows the whole country
const NATIONAL_ZOOM: f64 = 5.5;

/// Bounding box of the national territory, islands included
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NationalExtent {
    rect: Rect<f64>,
}

/// The extent that generated conglomerados must fall in
pub fn national_extent() -> NationalExtent {
    NationalExtent {
        rect: Rect::new(coord! { x: -81.85, y: -4.25 }, coord! { x: -66.85, y: 13.40 }),
    }
}

impl NationalExtent {
    /// True when the coordinates are valid and inside the extent (edges included)
    pub fn contains(&self, coordinates: &Coordinates) -> bool {
        validate_coordinates(coordinates).is_ok() && self.rect.intersects(&to_point(coordinates))
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub fn bbox(&self) -> [f64; 4] {
        let min = self.rect.min();
        let max = self.rect.max();
        [min.x, min.y, max.x, max.y]
    }

    /// Initial map view showing the whole country
    pub fn default_viewport(&self) -> Viewport {
        Viewport::new(NATIONAL_CENTER, NATIONAL_ZOOM)
    }
}
