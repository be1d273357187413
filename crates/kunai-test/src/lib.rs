//! Kunai CalDAV/CardDAV server - integration test support.
//!
//! Re-exports the workspace crates so the integration tests can reach the
//! router, store and settings through one dependency.

pub use kunai_app as app;
pub use kunai_core as core;
pub use kunai_rfc as rfc;
pub use kunai_service as service;
pub use kunai_store as store;
