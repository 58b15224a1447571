//! IFN Geo - Map geometry for the review console
//!
//! This crate converts unit coordinates to `geo` types, knows the national
//! extent that generated units must fall in, exports units as GeoJSON, and
//! provides a headless map renderer that implements the `MapView` port.

pub mod export;
pub mod extent;
pub mod headless;
pub mod models;
pub mod validation;

pub use extent::{national_extent, NationalExtent};
pub use headless::HeadlessMap;
