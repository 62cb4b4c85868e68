//! Library crate for leaderboard-admin-back, exposing modules for binaries and integration tests.

/// Runtime configuration loaded from file and environment.
pub mod config;
/// Persistence layer: result documents and the storage backends.
pub mod dao;
/// Request and response payloads exposed over HTTP.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Ranking, export, admission and the live feed.
pub mod leaderboard;
/// Axum route trees.
pub mod routes;
/// Business logic between routes and storage.
pub mod services;
/// Shared application state.
pub mod state;
