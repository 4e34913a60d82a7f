//! # Fable Shared
//!
//! Wire types shared between the API server and clients: request/response
//! DTOs (camelCase JSON) and the error envelope.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
