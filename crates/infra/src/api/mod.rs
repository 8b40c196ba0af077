//! Typed API adapters over the session client.

pub mod complaints;

pub use complaints::ComplaintsApi;
