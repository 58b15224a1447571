//! In-memory conglomerado service for development and testing.
//!
//! This implementation uses `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. Every call yields to the runtime once before it
//! is served, the way a network round trip would.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use ifn_core::error::{IfnError, Result};
use ifn_core::models::{
    ActorId, RegionId, RegionRecord, RegionRef, SessionContext, UnitId, UnitRecord,
    UnitStatistics, UnitStatus,
};
use ifn_core::ports::ConglomeradoService;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// A call as received by the service
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    ListUnits(Option<UnitStatus>),
    GetUnit(UnitId),
    ListRegions,
    Approve { id: UnitId, region: RegionId, actor: ActorId },
    Reject { id: UnitId, reason: String, actor: ActorId },
    Generate(u32),
    Statistics,
    Delete(UnitId),
}

/// Kind of call, used to target an injected failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    ListUnits,
    GetUnit,
    ListRegions,
    Approve,
    Reject,
    Generate,
    Statistics,
    Delete,
}

impl ServiceCall {
    pub fn kind(&self) -> CallKind {
        match self {
            ServiceCall::ListUnits(_) => CallKind::ListUnits,
            ServiceCall::GetUnit(_) => CallKind::GetUnit,
            ServiceCall::ListRegions => CallKind::ListRegions,
            ServiceCall::Approve { .. } => CallKind::Approve,
            ServiceCall::Reject { .. } => CallKind::Reject,
            ServiceCall::Generate(_) => CallKind::Generate,
            ServiceCall::Statistics => CallKind::Statistics,
            ServiceCall::Delete(_) => CallKind::Delete,
        }
    }
}

/// Failure to inject into a call
#[derive(Debug, Clone, PartialEq)]
pub enum FailureMode {
    /// The service answered with an error message
    Remote(String),
    /// The service refused the token
    AuthExpired,
    /// The service could not be reached
    Transport,
}

impl FailureMode {
    fn into_error(self) -> IfnError {
        match self {
            FailureMode::Remote(message) => IfnError::Remote { status: Some(500), message },
            FailureMode::AuthExpired => IfnError::AuthExpired,
            FailureMode::Transport => IfnError::Transport("connection refused".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
struct ArmedFailure {
    on: Option<CallKind>,
    mode: FailureMode,
}

/// In-memory implementation of ConglomeradoService
#[derive(Debug, Clone, Default)]
pub struct MemoryConglomeradoService {
    session: SessionContext,
    units: Arc<RwLock<Vec<UnitRecord>>>,
    regions: Arc<RwLock<Vec<RegionRecord>>>,
    calls: Arc<RwLock<Vec<ServiceCall>>>,
    failures: Arc<RwLock<VecDeque<ArmedFailure>>>,
    generated: Arc<RwLock<Option<Vec<UnitRecord>>>>,
    next_id: Arc<RwLock<u64>>,
}

impl MemoryConglomeradoService {
    /// Create an empty service that authorizes calls with `session`
    pub fn new(session: SessionContext) -> Self {
        Self { session, ..Self::default() }
    }

    /// Store a unit, replacing any stored unit with the same id
    pub fn insert_unit(&self, unit: UnitRecord) {
        let mut units = self.units.write().unwrap();
        match units.iter_mut().find(|u| u.id == unit.id) {
            Some(existing) => *existing = unit,
            None => units.push(unit),
        }
    }

    pub fn insert_region(&self, id: &str, name: &str, code: &str) {
        self.regions.write().unwrap().push(RegionRecord {
            id: RegionId::from(id),
            name: name.to_string(),
            code: code.to_string(),
        });
    }

    /// Current stored state of a unit
    pub fn unit(&self, id: &UnitId) -> Option<UnitRecord> {
        self.units.read().unwrap().iter().find(|u| &u.id == id).cloned()
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self, kind: CallKind) -> usize {
        self.calls.read().unwrap().iter().filter(|c| c.kind() == kind).count()
    }

    /// Fail the next call, whatever it is
    pub fn fail_next(&self, mode: FailureMode) {
        self.failures.write().unwrap().push_back(ArmedFailure { on: None, mode });
    }

    /// Fail the next call of `kind`
    pub fn fail_next_on(&self, kind: CallKind, mode: FailureMode) {
        self.failures.write().unwrap().push_back(ArmedFailure { on: Some(kind), mode });
    }

    /// Answer the next generation with exactly these units
    pub fn queue_generated(&self, units: Vec<UnitRecord>) {
        *self.generated.write().unwrap() = Some(units);
    }

    /// Authorize, record and possibly fail a call
    async fn receive(&self, call: ServiceCall) -> Result<()> {
        self.session.bearer_token()?;
        tokio::task::yield_now().await;

        let kind = call.kind();
        self.calls.write().unwrap().push(call);

        let mut failures = self.failures.write().unwrap();
        let position = failures.iter().position(|f| f.on.is_none_or(|on| on == kind));
        match position.and_then(|i| failures.remove(i)) {
            Some(failure) => Err(failure.mode.into_error()),
            None => Ok(()),
        }
    }

    fn with_pending_unit<F>(&self, id: &UnitId, apply: F) -> Result<UnitRecord>
    where
        F: FnOnce(&mut UnitRecord) -> Result<()>,
    {
        let mut units = self.units.write().unwrap();
        let unit = units.iter_mut().find(|u| &u.id == id).ok_or_else(|| IfnError::Remote {
            status: Some(404),
            message: "Conglomerado no encontrado".to_string(),
        })?;
        if !unit.is_pending() {
            return Err(IfnError::Remote {
                status: Some(409),
                message: "Conglomerado ya revisado".to_string(),
            });
        }
        apply(unit)?;
        Ok(unit.clone())
    }

    fn next_unit(&self) -> UnitRecord {
        let mut next_id = self.next_id.write().unwrap();
        *next_id += 1;
        let n = *next_id;

        // Spread points over the Andean region without a random source.
        let latitude = 1.5 + ((n * 37) % 80) as f64 / 10.0;
        let longitude = -77.0 + ((n * 53) % 60) as f64 / 10.0;
        UnitRecord::pending(
            format!("gen-{}", n),
            format!("CONG-{:05}", n),
            latitude,
            longitude,
            Utc::now() + Duration::milliseconds(n as i64),
        )
    }
}

#[async_trait]
impl ConglomeradoService for MemoryConglomeradoService {
    async fn list_units(&self, status: Option<UnitStatus>) -> Result<Vec<UnitRecord>> {
        self.receive(ServiceCall::ListUnits(status)).await?;
        let units = self.units.read().unwrap();
        Ok(units.iter().filter(|u| status.is_none_or(|s| u.status() == s)).cloned().collect())
    }

    async fn get_unit(&self, id: &UnitId) -> Result<UnitRecord> {
        self.receive(ServiceCall::GetUnit(id.clone())).await?;
        self.unit(id).ok_or_else(|| IfnError::UnitNotFound { id: id.to_string() })
    }

    async fn list_regions(&self) -> Result<Vec<RegionRecord>> {
        self.receive(ServiceCall::ListRegions).await?;
        Ok(self.regions.read().unwrap().clone())
    }

    async fn approve(&self, id: &UnitId, region: &RegionId, actor: &ActorId) -> Result<UnitRecord> {
        self.receive(ServiceCall::Approve {
            id: id.clone(),
            region: region.clone(),
            actor: actor.clone(),
        })
        .await?;

        let record = self
            .regions
            .read()
            .unwrap()
            .iter()
            .find(|r| &r.id == region)
            .cloned()
            .ok_or_else(|| IfnError::Remote {
                status: Some(400),
                message: "Departamento no existe".to_string(),
            })?;

        self.with_pending_unit(id, |unit| {
            unit.record_approval(RegionRef::new(record.id).with_name(record.name))
        })
    }

    async fn reject(&self, id: &UnitId, reason: &str, actor: &ActorId) -> Result<UnitRecord> {
        self.receive(ServiceCall::Reject {
            id: id.clone(),
            reason: reason.to_string(),
            actor: actor.clone(),
        })
        .await?;

        if reason.trim().is_empty() {
            return Err(IfnError::Remote {
                status: Some(400),
                message: "La razón es obligatoria".to_string(),
            });
        }
        self.with_pending_unit(id, |unit| unit.record_rejection(reason))
    }

    async fn generate(&self, count: u32) -> Result<Vec<UnitRecord>> {
        self.receive(ServiceCall::Generate(count)).await?;

        if !(1..=100).contains(&count) {
            return Err(IfnError::Remote {
                status: Some(400),
                message: "Cantidad debe estar entre 1 y 100".to_string(),
            });
        }

        let units = match self.generated.write().unwrap().take() {
            Some(units) => units,
            None => (0..count).map(|_| self.next_unit()).collect(),
        };
        self.units.write().unwrap().extend(units.iter().cloned());
        Ok(units)
    }

    async fn statistics(&self) -> Result<UnitStatistics> {
        self.receive(ServiceCall::Statistics).await?;
        Ok(UnitStatistics::from_units(&self.units.read().unwrap()))
    }

    async fn delete_unit(&self, id: &UnitId) -> Result<()> {
        self.receive(ServiceCall::Delete(id.clone())).await?;
        let mut units = self.units.write().unwrap();
        let before = units.len();
        units.retain(|u| &u.id != id);
        if units.len() == before {
            return Err(IfnError::Remote {
                status: Some(404),
                message: "Conglomerado no encontrado".to_string(),
            });
        }
        Ok(())
    }
}
