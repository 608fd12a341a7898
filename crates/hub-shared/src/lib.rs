//! # Hub Shared
//!
//! Wire types shared by `api-server` and `hub-client`.
//! Request DTOs carry their own validation rules; response DTOs are built from
//! domain types and never carry credentials.

pub mod dto;
pub mod response;
pub mod validation;

pub use response::{ApiResponse, Empty, ErrorResponse, FieldError};
