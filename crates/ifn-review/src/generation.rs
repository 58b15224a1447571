//! Batch generation of new conglomerados.
//!
//! The service places the units; this side validates the requested count,
//! keeps a single request outstanding, and reports what came back.

use ifn_core::error::{Result, ValidationError};
use ifn_core::models::{UnitId, UnitRecord, SUBPARCELS_PER_UNIT};
use ifn_core::ports::ConglomeradoService;
use ifn_geo::national_extent;
use ifn_geo::validation::validate_coordinates;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub const MIN_GENERATION_COUNT: u32 = 1;
pub const MAX_GENERATION_COUNT: u32 = 100;

/// A validated generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationPlan {
    pub count: u32,
    /// Subparcelas the service will create along with the units
    pub subparcels: usize,
}

/// Validate `count` and describe what generating it implies
pub fn plan(count: u32) -> std::result::Result<GenerationPlan, ValidationError> {
    if !(MIN_GENERATION_COUNT..=MAX_GENERATION_COUNT).contains(&count) {
        return Err(ValidationError::CountOutOfRange {
            count,
            min: MIN_GENERATION_COUNT,
            max: MAX_GENERATION_COUNT,
        });
    }
    Ok(GenerationPlan { count, subparcels: count as usize * SUBPARCELS_PER_UNIT })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub requested: u32,
    pub units: Vec<UnitRecord>,
    /// Generated units whose coordinates fall outside the national extent
    pub outside_extent: Vec<UnitId>,
}

impl GenerationResult {
    pub fn units_created(&self) -> usize {
        self.units.len()
    }

    pub fn subparcel_count(&self) -> usize {
        self.units.len() * SUBPARCELS_PER_UNIT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(GenerationResult),
    /// Another request is still outstanding; nothing was sent
    AlreadyInFlight,
}

pub struct GenerationRequestController<S: ConglomeradoService + ?Sized> {
    service: Arc<S>,
    in_flight: AtomicBool,
    last_result: Mutex<Option<GenerationResult>>,
}

struct InFlightFlag<'a>(&'a AtomicBool);

impl Drop for InFlightFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: ConglomeradoService + ?Sized> GenerationRequestController<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service, in_flight: AtomicBool::new(false), last_result: Mutex::new(None) }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Result of the last successful request. A failed request keeps it.
    pub fn last_result(&self) -> Option<GenerationResult> {
        self.last_result.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Forget the last result
    pub fn reset(&self) {
        *self.last_result.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Ask the service for `count` new units
    pub async fn request(&self, count: u32) -> Result<GenerationOutcome> {
        let plan = plan(count)?;

        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("Generation already in flight, ignoring request for {}", count);
            return Ok(GenerationOutcome::AlreadyInFlight);
        }
        let _flag = InFlightFlag(&self.in_flight);

        tracing::info!("Requesting {} conglomerados ({} subparcelas)", plan.count, plan.subparcels);
        let units = self.service.generate(plan.count).await.inspect_err(|e| {
            tracing::warn!("Generation failed: {}", e);
        })?;

        let extent = national_extent();
        let outside_extent: Vec<UnitId> = units
            .iter()
            .filter(|u| !extent.contains(&u.coordinates()))
            .map(|u| u.id.clone())
            .collect();
        for unit in units.iter().filter(|u| outside_extent.contains(&u.id)) {
            match validate_coordinates(&unit.coordinates()) {
                Err(reason) => {
                    tracing::warn!("Generated conglomerado {} has invalid coordinates: {}", unit.id, reason)
                }
                Ok(()) => {
                    tracing::warn!("Generated conglomerado {} lies outside the national extent", unit.id)
                }
            }
        }
        if units.len() != plan.count as usize {
            tracing::warn!("Requested {} conglomerados, service created {}", plan.count, units.len());
        }

        let result = GenerationResult { requested: plan.count, units, outside_extent };
        *self.last_result.lock().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());

        tracing::info!("Generated {} conglomerados", result.units_created());
        Ok(GenerationOutcome::Generated(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ifn_client::memory::{FailureMode, MemoryConglomeradoService, ServiceCall};
    use ifn_core::error::IfnError;
    use ifn_core::models::{Actor, ActorId, Role, Session, SessionContext};

    fn service() -> Arc<MemoryConglomeradoService> {
        let session = SessionContext::signed_in(Session::new(
            "token",
            Actor {
                id: ActorId::from("U1"),
                name: "Revisor".to_string(),
                email: "revisor@ifn.example".to_string(),
                role: Role::AdminPro,
            },
        ));
        Arc::new(MemoryConglomeradoService::new(session))
    }

    #[test]
    fn test_plan_bounds() {
        assert_eq!(plan(1).unwrap(), GenerationPlan { count: 1, subparcels: 5 });
        assert_eq!(plan(100).unwrap().subparcels, 500);
        assert_eq!(
            plan(0).unwrap_err(),
            ValidationError::CountOutOfRange { count: 0, min: 1, max: 100 }
        );
        assert!(plan(101).is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_count_never_calls_service() {
        let service = service();
        let controller = GenerationRequestController::new(service.clone());

        let err = controller.request(0).await.unwrap_err();

        assert!(matches!(err, IfnError::Validation(ValidationError::CountOutOfRange { .. })));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generate_reports_units_and_subparcels() {
        let service = service();
        let controller = GenerationRequestController::new(service.clone());

        let outcome = controller.request(3).await.unwrap();

        let GenerationOutcome::Generated(result) = outcome else {
            panic!("expected a generated result");
        };
        assert_eq!(result.units_created(), 3);
        assert_eq!(result.subparcel_count(), 15);
        assert!(result.outside_extent.is_empty());
        assert!(result.units.iter().all(UnitRecord::is_pending));
        assert_eq!(controller.last_result(), Some(result));
    }

    #[tokio::test]
    async fn test_maximum_count_is_accepted() {
        let service = service();
        let controller = GenerationRequestController::new(service.clone());

        let GenerationOutcome::Generated(result) = controller.request(100).await.unwrap() else {
            panic!("expected a generated result");
        };

        assert_eq!(service.calls(), vec![ServiceCall::Generate(100)]);
        assert_eq!(result.requested, 100);
        assert_eq!(result.units_created(), 100);
        assert_eq!(result.subparcel_count(), 500);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_result() {
        let service = service();
        let controller = GenerationRequestController::new(service.clone());
        controller.request(2).await.unwrap();

        service.fail_next(FailureMode::Remote("cuota excedida".to_string()));
        assert!(controller.request(5).await.is_err());

        assert_eq!(controller.last_result().unwrap().units_created(), 2);
        assert!(!controller.is_in_flight());

        controller.reset();
        assert!(controller.last_result().is_none());
    }

    #[tokio::test]
    async fn test_second_request_while_in_flight_is_ignored() {
        let service = service();
        let controller = GenerationRequestController::new(service.clone());

        let (a, b) = tokio::join!(controller.request(2), controller.request(2));

        assert!(matches!(a.unwrap(), GenerationOutcome::Generated(_)));
        assert_eq!(b.unwrap(), GenerationOutcome::AlreadyInFlight);
        let generated =
            service.calls().iter().filter(|c| matches!(c, ServiceCall::Generate(_))).count();
        assert_eq!(generated, 1);
    }

    #[tokio::test]
    async fn test_units_outside_extent_are_flagged() {
        let service = service();
        service.queue_generated(vec![UnitRecord::pending("99", "C-099", 40.4, -3.7, Utc::now())]);
        let controller = GenerationRequestController::new(service.clone());

        let GenerationOutcome::Generated(result) = controller.request(1).await.unwrap() else {
            panic!("expected a generated result");
        };

        assert_eq!(result.outside_extent, vec![UnitId::from("99")]);
    }
}
