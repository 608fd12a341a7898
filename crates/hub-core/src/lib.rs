//! # Hub Core
//!
//! The domain layer of Project Hub.
//! Users, posts, their derived fields and the ports the infrastructure implements.
//! This crate has no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
