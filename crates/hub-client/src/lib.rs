//! # Hub Client
//!
//! Async client for the Project Hub REST API, used by frontends and tooling.
//!
//! `ApiClient` attaches the bearer token, decodes the shared DTOs and keeps a
//! short-lived `QueryCache` of GET responses that mutations invalidate by prefix.

mod cache;
mod client;
mod error;

pub use cache::QueryCache;
pub use client::ApiClient;
pub use error::ClientError;
