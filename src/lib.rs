//! coral-pos — point-of-sale backend
//!
//! Staff-facing REST API over an embedded SQLite store:
//! - Menu catalog and category management
//! - Order intake with server-authoritative total reconciliation
//! - Daily sales analytics (per-day and per-item rollups)

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod money;
pub mod orders;
pub mod response;
pub mod state;
pub mod validation;

pub use error::{AppError, AppResult};
pub use state::AppState;
