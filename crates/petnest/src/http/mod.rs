//! HTTP request execution.
//!
//! This module provides the authenticated client and the request description
//! it sends.

mod client;
pub mod endpoints;
mod request;

pub(crate) use client::ensure_success;

pub use client::ApiClient;
pub use request::{Body, Multipart, OutboundRequest};
