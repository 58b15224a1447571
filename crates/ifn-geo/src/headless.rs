//! Map renderer without a display.
//!
//! `HeadlessMap` keeps the camera, marker layer and overlay in memory and
//! records every command it receives. The CLI uses it to describe what the
//! map would show; tests use the command log to check sequencing.

use ifn_core::models::{AnimationTicket, Marker, Overlay, Viewport};
use ifn_core::ports::{MapEvent, MapView};
use std::collections::VecDeque;
use std::time::Duration;

use crate::extent::national_extent;

/// A command received through the `MapView` port
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    FlyTo { target: Viewport, duration: Duration, ticket: AnimationTicket },
    SetMarkers(usize),
    ShowOverlay(Overlay),
    HideOverlay,
}

#[derive(Debug, Clone)]
pub struct HeadlessMap {
    viewport: Viewport,
    markers: Vec<Marker>,
    overlay: Option<Overlay>,
    in_flight: VecDeque<AnimationTicket>,
    auto_complete: bool,
    log: Vec<MapCommand>,
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessMap {
    /// Map showing the whole country; animations stay in flight until
    /// `finish_animations` is called
    pub fn new() -> Self {
        Self {
            viewport: national_extent().default_viewport(),
            markers: Vec::new(),
            overlay: None,
            in_flight: VecDeque::new(),
            auto_complete: false,
            log: Vec::new(),
        }
    }

    /// Map whose animations settle as soon as they start
    pub fn instant() -> Self {
        Self { auto_complete: true, ..Self::new() }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn commands(&self) -> &[MapCommand] {
        &self.log
    }

    /// Overlays shown so far, oldest first
    pub fn shown_overlays(&self) -> Vec<&Overlay> {
        self.log
            .iter()
            .filter_map(|c| match c {
                MapCommand::ShowOverlay(overlay) => Some(overlay),
                _ => None,
            })
            .collect()
    }

    /// Settle every animation in flight and return the completion events in
    /// the order the animations were started
    pub fn finish_animations(&mut self) -> Vec<MapEvent> {
        self.in_flight.drain(..).map(MapEvent::AnimationComplete).collect()
    }
}

impl MapView for HeadlessMap {
    fn fly_to(&mut self, target: Viewport, duration: Duration, ticket: AnimationTicket) {
        tracing::debug!(
            "fly_to {} zoom {} ({:?}, ticket {})",
            target.center,
            target.zoom,
            duration,
            ticket.0
        );
        self.viewport = target;
        if !self.auto_complete {
            self.in_flight.push_back(ticket);
        }
        self.log.push(MapCommand::FlyTo { target, duration, ticket });
    }

    fn set_markers(&mut self, markers: Vec<Marker>) {
        self.log.push(MapCommand::SetMarkers(markers.len()));
        self.markers = markers;
    }

    fn show_overlay(&mut self, overlay: Overlay) {
        self.log.push(MapCommand::ShowOverlay(overlay.clone()));
        self.overlay = Some(overlay);
    }

    fn hide_overlay(&mut self) {
        if self.overlay.take().is_some() {
            self.log.push(MapCommand::HideOverlay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifn_core::models::{Coordinates, UnitId};

    fn overlay(id: &str) -> Overlay {
        Overlay {
            unit_id: UnitId::from(id),
            anchor: Coordinates::new(4.6, -74.1),
            title: id.to_string(),
            lines: Vec::new(),
        }
    }

    #[test]
    fn test_fly_to_moves_camera_and_queues_completion() {
        let mut map = HeadlessMap::new();
        let target = Viewport::new(Coordinates::new(6.2, -75.5), 14.0);

        map.fly_to(target, Duration::from_millis(1500), AnimationTicket(1));
        map.fly_to(target, Duration::from_millis(1500), AnimationTicket(2));

        assert_eq!(map.viewport(), target);
        assert_eq!(
            map.finish_animations(),
            vec![
                MapEvent::AnimationComplete(AnimationTicket(1)),
                MapEvent::AnimationComplete(AnimationTicket(2)),
            ]
        );
        assert!(map.finish_animations().is_empty());
    }

    #[test]
    fn test_instant_map_never_queues() {
        let mut map = HeadlessMap::instant();
        map.fly_to(
            Viewport::new(Coordinates::new(1.0, -75.0), 10.0),
            Duration::ZERO,
            AnimationTicket(7),
        );
        assert!(map.finish_animations().is_empty());
    }

    #[test]
    fn test_hide_overlay_only_logs_when_shown() {
        let mut map = HeadlessMap::new();
        map.hide_overlay();
        assert!(map.commands().is_empty());

        map.show_overlay(overlay("a"));
        map.hide_overlay();
        assert_eq!(map.commands().len(), 2);
        assert!(map.overlay().is_none());
        assert_eq!(map.shown_overlays().len(), 1);
    }
}
