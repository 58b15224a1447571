//! Map/list selection coordination.
//!
//! Selecting a unit flies the map to it and, once the camera settled, shows
//! an overlay with the unit details. Every selection gets a fresh animation
//! ticket; a completion carrying an older ticket is ignored, so after rapid
//! reselection only the last unit's overlay appears.

use ifn_core::config::LayeredConfig;
use ifn_core::models::{
    AnimationTicket, Marker, Overlay, ReviewState, UnitId, UnitRecord, Viewport,
};
use ifn_core::ports::{MapEvent, MapView};
use std::time::{Duration, Instant};

/// Extra time past the nominal animation before the overlay is forced open
const OVERLAY_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionConfig {
    pub focus_zoom: f64,
    pub animation: Duration,
}

impl SelectionConfig {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self { focus_zoom: config.focus_zoom.value, animation: config.animation_duration() }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::from_config(&LayeredConfig::with_defaults())
    }
}

#[derive(Debug)]
struct PendingOverlay {
    ticket: AnimationTicket,
    overlay: Overlay,
    deadline: Instant,
}

pub struct SelectionCoordinator<M: MapView> {
    map: M,
    config: SelectionConfig,
    selected: Option<UnitId>,
    pending: Option<PendingOverlay>,
    next_ticket: u64,
    markers: Vec<Marker>,
}

impl<M: MapView> SelectionCoordinator<M> {
    pub fn new(map: M, config: SelectionConfig) -> Self {
        Self { map, config, selected: None, pending: None, next_ticket: 0, markers: Vec::new() }
    }

    pub fn selected(&self) -> Option<&UnitId> {
        self.selected.as_ref()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn has_pending_overlay(&self) -> bool {
        self.pending.is_some()
    }

    /// Select `unit` and focus the map on it.
    ///
    /// Selecting the unit that is already selected recenters on it again.
    pub fn select(&mut self, unit: &UnitRecord, now: Instant) -> AnimationTicket {
        self.next_ticket += 1;
        let ticket = AnimationTicket(self.next_ticket);

        if let Some(superseded) = self.pending.take() {
            tracing::debug!("Overlay for {} superseded", superseded.overlay.unit_id);
        }
        self.map.hide_overlay();

        self.selected = Some(unit.id.clone());
        self.map.fly_to(
            Viewport::new(unit.coordinates(), self.config.focus_zoom),
            self.config.animation,
            ticket,
        );
        self.pending = Some(PendingOverlay {
            ticket,
            overlay: overlay_for(unit),
            deadline: now + self.config.animation + OVERLAY_GRACE,
        });
        self.publish_markers();

        tracing::debug!("Selected {} (ticket {})", unit.code, ticket.0);
        ticket
    }

    /// Feed a renderer event. Returns the unit to select when the reviewer
    /// clicked a marker.
    pub fn handle_event(&mut self, event: MapEvent) -> Option<UnitId> {
        match event {
            MapEvent::AnimationComplete(ticket) => {
                match self.pending.take() {
                    Some(pending) if pending.ticket == ticket => self.map.show_overlay(pending.overlay),
                    Some(pending) => {
                        tracing::trace!("Stale animation ticket {}", ticket.0);
                        self.pending = Some(pending);
                    }
                    None => {}
                }
                None
            }
            MapEvent::MarkerClicked(unit_id) => Some(unit_id),
            MapEvent::OverlayClosed => {
                self.pending = None;
                self.map.hide_overlay();
                None
            }
        }
    }

    /// Show the pending overlay if its animation never reported completion
    pub fn tick(&mut self, now: Instant) {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            if let Some(pending) = self.pending.take() {
                tracing::debug!("Animation {} did not report completion", pending.ticket.0);
                self.map.show_overlay(pending.overlay);
            }
        }
    }

    /// Drop the selection. The viewport stays where it is.
    pub fn clear(&mut self) {
        self.pending = None;
        self.map.hide_overlay();
        if self.selected.take().is_some() {
            self.publish_markers();
        }
    }

    /// Replace the marker layer with `units`, clearing the selection if its
    /// unit is not among them
    pub fn sync(&mut self, units: &[UnitRecord]) {
        if let Some(selected) = &self.selected {
            if !units.iter().any(|u| &u.id == selected) {
                tracing::debug!("Selected unit {} is no longer visible", selected);
                self.selected = None;
                self.pending = None;
                self.map.hide_overlay();
            }
        }
        self.markers = units.iter().map(marker_for).collect();
        self.publish_markers();
    }

    fn publish_markers(&mut self) {
        for marker in &mut self.markers {
            marker.highlighted = self.selected.as_ref() == Some(&marker.unit_id);
        }
        self.map.set_markers(self.markers.clone());
    }
}

fn marker_for(unit: &UnitRecord) -> Marker {
    Marker {
        unit_id: unit.id.clone(),
        label: unit.code.clone(),
        position: unit.coordinates(),
        badge: unit.status().display().badge,
        highlighted: false,
    }
}

/// Overlay content for a unit
pub fn overlay_for(unit: &UnitRecord) -> Overlay {
    let mut lines = vec![format!("Estado: {}", unit.status().display().label)];
    match &unit.review {
        ReviewState::Pending => {}
        ReviewState::Approved { region } => {
            let name = region.name.as_deref().unwrap_or(region.id.as_str());
            lines.push(format!("Departamento: {}", name));
        }
        ReviewState::Rejected { reason } => lines.push(format!("Razón: {}", reason)),
    }
    lines.push(format!("Coordenadas: {}", unit.coordinates()));
    lines.push(format!("Creado: {}", unit.created_label()));

    Overlay { unit_id: unit.id.clone(), anchor: unit.coordinates(), title: unit.code.clone(), lines }
}
