//! Command interface of the orchestrator.
//!
//! Provides:
//! - Request/response and status messages
//! - A cloneable client handle
//! - A newline-delimited JSON host for external controllers

pub mod handle;
pub mod host;
pub mod protocol;

pub use handle::{Envelope, OrchestratorHandle};
pub use host::serve;
pub use protocol::{Request, Response, StatusReport};
