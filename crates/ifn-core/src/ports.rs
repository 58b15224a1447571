//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod map;
pub mod service;

pub use map::{MapEvent, MapView};
pub use service::ConglomeradoService;
