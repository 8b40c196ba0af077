//! HTTP transport wrapper.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
