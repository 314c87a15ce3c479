//! # Shift Planner
//!
//! Volunteer shift planning: facilities publish shifts for tasks, volunteers
//! sign up for them, and every shift renders its own description, ending
//! time and the planner URL it is listed under.
//!
//! ## Architecture
//!
//! - [`models`]: shift, sign-up and organization records with their derived values
//! - [`routes`]: named routes, URL reversal and the response shapes they serve
//! - [`db`]: repository traits, the in-memory and Postgres backends, services
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`api`]: re-exports of the public types
//!
//! ## Invariants
//!
//! A volunteer joins a shift at most once. Storage enforces this atomically
//! (a unique index in Postgres, one write lock in memory) and reports a
//! duplicate as [`db::RepositoryError::UniqueViolation`].

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod routes;

#[cfg(feature = "http-server")]
pub mod http;
