//! Approve/reject lifecycle of a conglomerado.
//!
//! A unit moves Pending -> Approved or Pending -> Rejected exactly once.
//! Commits are pessimistic: the local record changes only after the service
//! acknowledged the decision, so a failed call leaves the unit untouched.

use ifn_core::error::{IfnError, Result, ValidationError};
use ifn_core::models::{ActorId, RegionId, RegionRef, SessionContext, UnitId, UnitRecord};
use ifn_core::ports::ConglomeradoService;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Input collected while a decision dialog is open
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DecisionDraft {
    Approve { region: Option<RegionId> },
    Reject { reason: String },
}

impl DecisionDraft {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        match self {
            DecisionDraft::Approve { region } => match region {
                Some(region) if !region.is_blank() => Ok(()),
                _ => Err(ValidationError::MissingRegion),
            },
            DecisionDraft::Reject { reason } => {
                if reason.trim().is_empty() {
                    Err(ValidationError::EmptyReason)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// An open decision on one unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingDecision {
    pub unit_id: UnitId,
    pub unit_code: String,
    pub draft: DecisionDraft,
    #[serde(skip)]
    epoch: u64,
}

impl PendingDecision {
    /// Whether the confirm action is enabled
    pub fn can_commit(&self) -> bool {
        self.draft.validate().is_ok()
    }
}

/// What happened to a commit request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommitOutcome {
    /// The service accepted the decision and the unit was updated
    Committed,
    /// A commit for this unit was already outstanding; nothing was sent
    AlreadyInFlight,
    /// The service accepted the decision but its dialog had been closed in
    /// the meantime, so the local record was left for the next reload
    Dismissed,
}

#[derive(Clone, Copy)]
enum Decision<'a> {
    Approve(&'a RegionId),
    Reject(&'a str),
}

#[derive(Default)]
struct LifecycleState {
    decision: Option<PendingDecision>,
    in_flight: HashSet<UnitId>,
    next_epoch: u64,
}

pub struct LifecycleController<S: ConglomeradoService + ?Sized> {
    service: Arc<S>,
    session: SessionContext,
    state: Mutex<LifecycleState>,
}

/// Removes the unit from the in-flight set however the commit ends
struct InFlightGuard<'a> {
    state: &'a Mutex<LifecycleState>,
    unit_id: UnitId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).in_flight.remove(&self.unit_id);
    }
}

impl<S: ConglomeradoService + ?Sized> LifecycleController<S> {
    pub fn new(service: Arc<S>, session: SessionContext) -> Self {
        Self { service, session, state: Mutex::new(LifecycleState::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open an approval decision; the unit must still be pending
    pub fn begin_approve(&self, unit: &UnitRecord) -> Result<PendingDecision> {
        self.begin(unit, DecisionDraft::Approve { region: None })
    }

    /// Open a rejection decision; the unit must still be pending
    pub fn begin_reject(&self, unit: &UnitRecord) -> Result<PendingDecision> {
        self.begin(unit, DecisionDraft::Reject { reason: String::new() })
    }

    fn begin(&self, unit: &UnitRecord, draft: DecisionDraft) -> Result<PendingDecision> {
        unit.ensure_pending()?;

        let mut state = self.lock();
        state.next_epoch += 1;
        let decision = PendingDecision {
            unit_id: unit.id.clone(),
            unit_code: unit.code.clone(),
            draft,
            epoch: state.next_epoch,
        };
        state.decision = Some(decision.clone());
        Ok(decision)
    }

    /// The open decision, if any
    pub fn pending(&self) -> Option<PendingDecision> {
        self.lock().decision.clone()
    }

    /// Set the region of an open approval. Returns false when no approval is open.
    pub fn select_region(&self, region: RegionId) -> bool {
        match self.lock().decision.as_mut().map(|d| &mut d.draft) {
            Some(DecisionDraft::Approve { region: slot }) => {
                *slot = Some(region);
                true
            }
            _ => false,
        }
    }

    /// Set the reason of an open rejection. Returns false when no rejection is open.
    pub fn set_reason(&self, reason: &str) -> bool {
        match self.lock().decision.as_mut().map(|d| &mut d.draft) {
            Some(DecisionDraft::Reject { reason: slot }) => {
                *slot = reason.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn can_commit(&self) -> bool {
        self.lock().decision.as_ref().is_some_and(PendingDecision::can_commit)
    }

    /// Close the open decision without changing anything
    pub fn cancel(&self) {
        if let Some(decision) = self.lock().decision.take() {
            tracing::debug!("Decision on {} cancelled", decision.unit_code);
        }
    }

    pub fn is_in_flight(&self, unit_id: &UnitId) -> bool {
        self.lock().in_flight.contains(unit_id)
    }

    /// Approve `unit` and assign it to `region`
    pub async fn commit_approve(
        &self,
        unit: &mut UnitRecord,
        region: &RegionId,
        actor: &ActorId,
    ) -> Result<CommitOutcome> {
        self.commit(unit, Decision::Approve(region), actor).await
    }

    /// Reject `unit` with `reason`
    pub async fn commit_reject(
        &self,
        unit: &mut UnitRecord,
        reason: &str,
        actor: &ActorId,
    ) -> Result<CommitOutcome> {
        self.commit(unit, Decision::Reject(reason), actor).await
    }

    /// Commit the open decision for `unit` as the signed-in reviewer
    pub async fn confirm(&self, unit: &mut UnitRecord) -> Result<CommitOutcome> {
        let decision = self
            .pending()
            .filter(|d| d.unit_id == unit.id)
            .ok_or(IfnError::NoOpenDecision)?;
        let actor = self.session.actor()?.id;

        match &decision.draft {
            DecisionDraft::Approve { region } => {
                let region = region.as_ref().ok_or(ValidationError::MissingRegion)?;
                self.commit(unit, Decision::Approve(region), &actor).await
            }
            DecisionDraft::Reject { reason } => {
                self.commit(unit, Decision::Reject(reason), &actor).await
            }
        }
    }

    async fn commit(
        &self,
        unit: &mut UnitRecord,
        decision: Decision<'_>,
        actor: &ActorId,
    ) -> Result<CommitOutcome> {
        // Everything below up to the service call is local: nothing is sent
        // unless all of it passes.
        unit.ensure_pending()?;
        match decision {
            Decision::Approve(region) if region.is_blank() => {
                return Err(ValidationError::MissingRegion.into())
            }
            Decision::Reject(reason) if reason.trim().is_empty() => {
                return Err(ValidationError::EmptyReason.into())
            }
            _ => {}
        }
        self.session.require()?;

        let epoch = {
            let mut state = self.lock();
            if !state.in_flight.insert(unit.id.clone()) {
                tracing::debug!("Commit for {} already in flight, ignoring", unit.code);
                return Ok(CommitOutcome::AlreadyInFlight);
            }
            state.decision.as_ref().filter(|d| d.unit_id == unit.id).map(|d| d.epoch)
        };
        let _guard = InFlightGuard { state: &self.state, unit_id: unit.id.clone() };

        let response = match decision {
            Decision::Approve(region) => self.service.approve(&unit.id, region, actor).await,
            Decision::Reject(reason) => self.service.reject(&unit.id, reason.trim(), actor).await,
        };

        let updated = match response {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!("Decision on {} failed: {}", unit.code, e);
                return Err(e);
            }
        };

        if let Some(epoch) = epoch {
            let mut state = self.lock();
            match &state.decision {
                Some(open) if open.epoch == epoch => state.decision = None,
                _ => {
                    tracing::info!("Decision on {} acknowledged after its dialog closed", unit.code);
                    return Ok(CommitOutcome::Dismissed);
                }
            }
        }

        match decision {
            Decision::Approve(region) => {
                let mut assigned = RegionRef::new(region.clone());
                if let Some(name) = updated.assigned_region().and_then(|r| r.name.clone()) {
                    assigned = assigned.with_name(name);
                }
                unit.record_approval(assigned)?;
                tracing::info!("Approved {} into region {}", unit.code, region);
            }
            Decision::Reject(reason) => {
                unit.record_rejection(reason.trim())?;
                tracing::info!("Rejected {}", unit.code);
            }
        }

        Ok(CommitOutcome::Committed)
    }
}
