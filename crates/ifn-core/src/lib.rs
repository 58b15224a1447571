//! IFN Core - Domain models, session context, and configuration
//!
//! This crate contains the conglomerado domain model and the port definitions
//! that the review workflow is written against.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{ErrorCategory, IfnError, Result, ValidationError};
