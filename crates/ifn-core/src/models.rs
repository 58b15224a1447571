pub mod filter;
pub mod geometry;
pub mod region;
pub mod session;
pub mod unit;

pub use filter::StatusFilter;
pub use geometry::{AnimationTicket, Coordinates, Marker, Overlay, Viewport};
pub use region::{RegionId, RegionRecord};
pub use session::{Actor, ActorId, Role, Session, SessionContext};
pub use unit::{
    Badge, RegionRef, ReviewState, StatusDisplay, UnitId, UnitRecord, UnitStatistics, UnitStatus,
    SUBPARCELS_PER_UNIT,
};
