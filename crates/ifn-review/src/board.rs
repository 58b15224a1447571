//! The review board: loaded units, the filter projection over them, the
//! selection and the open decision, kept consistent with the service.

use futures::try_join;
use ifn_core::error::{IfnError, Result};
use ifn_core::models::{
    RegionId, RegionRecord, SessionContext, StatusFilter, UnitId, UnitRecord, UnitStatistics,
};
use ifn_core::ports::{ConglomeradoService, MapEvent, MapView};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::filter::project;
use crate::lifecycle::{CommitOutcome, LifecycleController, PendingDecision};
use crate::selection::{SelectionConfig, SelectionCoordinator};

/// Snapshot of what the reviewer is looking at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSessionState {
    pub status_filter: StatusFilter,
    pub search_text: String,
    pub selected_unit_id: Option<UnitId>,
    pub pending_decision: Option<PendingDecision>,
}

pub struct ReviewBoard<S: ConglomeradoService + ?Sized, M: MapView> {
    service: Arc<S>,
    session: SessionContext,
    units: Vec<UnitRecord>,
    regions: Vec<RegionRecord>,
    regions_loaded: bool,
    filter: StatusFilter,
    search: String,
    lifecycle: LifecycleController<S>,
    selection: SelectionCoordinator<M>,
    consistent: bool,
}

impl<S: ConglomeradoService + ?Sized, M: MapView> ReviewBoard<S, M> {
    pub fn new(service: Arc<S>, session: SessionContext, map: M, config: SelectionConfig) -> Self {
        Self {
            lifecycle: LifecycleController::new(service.clone(), session.clone()),
            selection: SelectionCoordinator::new(map, config),
            service,
            session,
            units: Vec::new(),
            regions: Vec::new(),
            regions_loaded: false,
            filter: StatusFilter::All,
            search: String::new(),
            consistent: false,
        }
    }

    /// Fetch the units for the current filter. Regions are fetched along
    /// with the first load only. On failure the board keeps what it had.
    pub async fn load(&mut self) -> Result<()> {
        self.fetch(self.filter).await
    }

    async fn fetch(&mut self, filter: StatusFilter) -> Result<()> {
        self.session.require()?;

        let status = filter.status();
        let (units, regions) = if self.regions_loaded {
            (self.service.list_units(status).await?, None)
        } else {
            let (units, regions) =
                try_join!(self.service.list_units(status), self.service.list_regions())?;
            (units, Some(regions))
        };

        if let Some(regions) = regions {
            tracing::debug!("Loaded {} regions", regions.len());
            self.regions = regions;
            self.regions_loaded = true;
        }
        tracing::debug!("Loaded {} conglomerados ({})", units.len(), filter);
        self.units = units;
        self.filter = filter;
        self.consistent = true;
        self.sync_selection();
        Ok(())
    }

    /// Switch the status filter and reload from the service
    pub async fn apply_filter(&mut self, filter: StatusFilter) -> Result<()> {
        self.fetch(filter).await
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
        self.sync_selection();
    }

    /// Units under the current filter and search
    pub fn visible(&self) -> Vec<UnitRecord> {
        project(&self.units, self.filter, &self.search)
    }

    pub fn units(&self) -> &[UnitRecord] {
        &self.units
    }

    pub fn regions(&self) -> &[RegionRecord] {
        &self.regions
    }

    pub fn unit(&self, id: &UnitId) -> Option<&UnitRecord> {
        self.units.iter().find(|u| &u.id == id)
    }

    /// Look a loaded unit up by its code, ignoring case
    pub fn find_by_code(&self, code: &str) -> Option<&UnitRecord> {
        let code = code.trim();
        self.units.iter().find(|u| u.code.eq_ignore_ascii_case(code))
    }

    /// Fetch one unit from the service and replace the loaded copy
    pub async fn refresh(&mut self, id: &UnitId) -> Result<UnitRecord> {
        self.session.require()?;
        let fresh = self.service.get_unit(id).await?;
        *find_mut(&mut self.units, id)? = fresh.clone();
        self.sync_selection();
        Ok(fresh)
    }

    /// False when a reload after a committed decision failed; the list may
    /// then be stale until the next successful load
    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    pub fn state(&self) -> ReviewSessionState {
        ReviewSessionState {
            status_filter: self.filter,
            search_text: self.search.clone(),
            selected_unit_id: self.selection.selected().cloned(),
            pending_decision: self.lifecycle.pending(),
        }
    }

    /// Counts per status as reported by the service
    pub async fn statistics(&self) -> Result<UnitStatistics> {
        self.session.require()?;
        self.service.statistics().await
    }

    pub fn selection(&self) -> &SelectionCoordinator<M> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionCoordinator<M> {
        &mut self.selection
    }

    /// Select a visible unit and focus the map on it
    pub fn select(&mut self, id: &UnitId, now: Instant) -> Result<()> {
        let unit = project(&self.units, self.filter, &self.search)
            .into_iter()
            .find(|u| &u.id == id)
            .ok_or_else(|| IfnError::UnitNotFound { id: id.to_string() })?;
        self.selection.select(&unit, now);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Feed a map renderer event; marker clicks select their unit
    pub fn handle_map_event(&mut self, event: MapEvent, now: Instant) -> Result<()> {
        match self.selection.handle_event(event) {
            Some(id) => self.select(&id, now),
            None => Ok(()),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.selection.tick(now);
    }

    pub fn begin_approve(&self, id: &UnitId) -> Result<PendingDecision> {
        self.lifecycle.begin_approve(self.require_unit(id)?)
    }

    pub fn begin_reject(&self, id: &UnitId) -> Result<PendingDecision> {
        self.lifecycle.begin_reject(self.require_unit(id)?)
    }

    pub fn select_region(&self, region: RegionId) -> bool {
        self.lifecycle.select_region(region)
    }

    pub fn set_reason(&self, reason: &str) -> bool {
        self.lifecycle.set_reason(reason)
    }

    pub fn can_commit(&self) -> bool {
        self.lifecycle.can_commit()
    }

    pub fn cancel_decision(&self) {
        self.lifecycle.cancel();
    }

    /// Approve a unit into `region` as the signed-in reviewer
    pub async fn approve(&mut self, id: &UnitId, region: &RegionId) -> Result<CommitOutcome> {
        let actor = self.session.actor()?.id;
        let unit = find_mut(&mut self.units, id)?;
        let outcome = self.lifecycle.commit_approve(unit, region, &actor).await?;
        self.after_commit(outcome).await;
        Ok(outcome)
    }

    /// Reject a unit with `reason` as the signed-in reviewer
    pub async fn reject(&mut self, id: &UnitId, reason: &str) -> Result<CommitOutcome> {
        let actor = self.session.actor()?.id;
        let unit = find_mut(&mut self.units, id)?;
        let outcome = self.lifecycle.commit_reject(unit, reason, &actor).await?;
        self.after_commit(outcome).await;
        Ok(outcome)
    }

    /// Commit the open decision
    pub async fn confirm(&mut self) -> Result<CommitOutcome> {
        let decision = self.lifecycle.pending().ok_or(IfnError::NoOpenDecision)?;
        let unit = find_mut(&mut self.units, &decision.unit_id)?;
        let outcome = self.lifecycle.confirm(unit).await?;
        self.after_commit(outcome).await;
        Ok(outcome)
    }

    /// Delete a unit on the service and reload
    pub async fn delete(&mut self, id: &UnitId) -> Result<()> {
        self.session.require()?;
        let code = self.require_unit(id)?.code.clone();
        self.service.delete_unit(id).await?;
        tracing::info!("Deleted {}", code);
        self.after_commit(CommitOutcome::Committed).await;
        Ok(())
    }

    async fn after_commit(&mut self, outcome: CommitOutcome) {
        if outcome == CommitOutcome::AlreadyInFlight {
            return;
        }
        if let Err(e) = self.load().await {
            tracing::warn!("Reload after decision failed, list may be stale: {}", e);
            self.consistent = false;
            self.sync_selection();
        }
    }

    fn require_unit(&self, id: &UnitId) -> Result<&UnitRecord> {
        self.unit(id).ok_or_else(|| IfnError::UnitNotFound { id: id.to_string() })
    }

    /// Republish markers for the visible units. A selection hidden by the
    /// current filter or search is cleared too, not only one whose unit left
    /// the loaded collection, so the overlay never points at an unlisted unit.
    fn sync_selection(&mut self) {
        let visible = project(&self.units, self.filter, &self.search);
        self.selection.sync(&visible);
    }
}

fn find_mut<'a>(units: &'a mut [UnitRecord], id: &UnitId) -> Result<&'a mut UnitRecord> {
    units
        .iter_mut()
        .find(|u| &u.id == id)
        .ok_or_else(|| IfnError::UnitNotFound { id: id.to_string() })
}
