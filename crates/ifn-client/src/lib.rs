//! IFN Client - Adapters for the external services
//!
//! This crate implements the `ConglomeradoService` port over HTTP, resolves
//! reviewer identities against the user directory, and provides an
//! in-memory service for development and testing.

pub mod auth;
pub mod http;
pub mod memory;
pub mod wire;

// Re-export main types
pub use auth::IdentityDirectory;
pub use http::HttpConglomeradoService;
pub use memory::MemoryConglomeradoService;
