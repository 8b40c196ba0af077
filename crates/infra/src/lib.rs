//! Infrastructure adapters for the CivicLink client core
//!
//! - [`http`]: reqwest wrapper with bounded timeouts
//! - [`session`]: credentials, secure storage, and the authenticated client
//! - [`api`]: typed endpoint adapters implementing the core gateway ports
//! - [`config`]: connection settings
//! - [`telemetry`]: tracing bootstrap and logging helpers

pub mod api;
pub mod config;
pub mod http;
pub mod session;
pub mod telemetry;

pub use api::ComplaintsApi;
pub use config::ApiConfig;
pub use http::HttpClient;
pub use session::{
    Credentials, KeyringStore, MemoryStore, RequestBody, SecureStore, SessionClient, StoreError,
};
