//! # API Shared
//!
//! Shared definitions for the STI screening front ends.
//!
//! Contains:
//! - Wire request/response types with OpenAPI schemas (`dto` module)
//! - Conversions between wire types and `sti-core` types
//! - Shared services like `HealthService`

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
