//! Shared types for the stride services: domain models, API request/response
//! shapes, and the signed-token contract every service verifies against.

pub mod api;
pub mod models;
pub mod token;
