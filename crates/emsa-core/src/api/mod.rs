//! REST API client module for the EMSA backend.
//!
//! `ApiClient` attaches `Authorization: Bearer <token>` whenever it holds a
//! token and classifies every failure into an `ApiError`, so callers can tell
//! an expired session apart from a denied or failed request.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiResponse, DEFAULT_BASE_URL};
pub use error::ApiError;
