//! # Project Hub API Server
//!
//! Actix-web application: configuration, shared state, middleware and the
//! REST handlers for users, posts, likes and bookmarks.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
