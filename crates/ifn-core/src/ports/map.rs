use std::time::Duration;

use crate::models::{AnimationTicket, Marker, Overlay, UnitId, Viewport};

/// Port for a map renderer.
///
/// The renderer animates the camera and reports completion through
/// `MapEvent::AnimationComplete` with the ticket it was given.
pub trait MapView {
    /// Start a camera animation towards `target`
    fn fly_to(&mut self, target: Viewport, duration: Duration, ticket: AnimationTicket);

    /// Replace the marker layer
    fn set_markers(&mut self, markers: Vec<Marker>);

    fn show_overlay(&mut self, overlay: Overlay);

    fn hide_overlay(&mut self);
}

/// Notifications emitted by a map renderer
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The animation started with this ticket has settled
    AnimationComplete(AnimationTicket),

    /// The reviewer clicked the marker of a unit
    MarkerClicked(UnitId),

    /// The reviewer closed the overlay
    OverlayClosed,
}
