//! PlateLog Gateway HTTP API Server
//!
//! One in-memory session log per API session; images are posted as raw
//! request bodies and the log is downloaded as XLSX.

pub mod error;
pub mod health_api;
pub mod server;
pub mod session_registry;
pub mod sessions_api;

pub use error::ApiError;
pub use server::{build_router, start_server, GatewayState};
pub use session_registry::{SessionId, SessionRegistry};
