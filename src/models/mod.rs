//! Response models for the admin HTTP API
//!
//! DTOs serialized as JSON by the admin endpoint.

pub mod responses;

pub use responses::{HealthResponse, StatsResponse};
