//! Session management: credentials, secure storage, and the authenticated
//! API client.
//!
//! ```text
//! ┌────────────────┐
//! │ SessionClient  │  owns Credentials, runs authenticated calls,
//! └───────┬────────┘  one-shot refresh-and-retry on expiry
//!         │
//!         ├──► SecureStore      (keychain / in-memory mirror)
//!         └──► HttpClient       (bounded-timeout transport)
//! ```

pub mod client;
pub mod store;
pub mod types;

pub use client::{MultipartData, MultipartField, RequestBody, SessionClient};
pub use store::{
    KeyringStore, MemoryStore, SecureStore, StoreError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
    USER_PROFILE_KEY,
};
pub use types::{ApiEnvelope, Credentials, EnvelopeError, LoginData, RefreshData, TOKEN_EXPIRED_CODE};
