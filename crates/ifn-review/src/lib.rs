//! IFN Review - Conglomerado review workflow
//!
//! This crate implements the review use cases: the filter projection over the
//! unit collection, the approve/reject lifecycle, map/list selection, and
//! batch generation requests.

pub mod board;
pub mod filter;
pub mod generation;
pub mod lifecycle;
pub mod selection;

pub use board::{ReviewBoard, ReviewSessionState};
pub use filter::project;
pub use generation::{
    plan, GenerationOutcome, GenerationPlan, GenerationRequestController, GenerationResult,
    MAX_GENERATION_COUNT, MIN_GENERATION_COUNT,
};
pub use lifecycle::{CommitOutcome, DecisionDraft, LifecycleController, PendingDecision};
pub use selection::{SelectionConfig, SelectionCoordinator};
