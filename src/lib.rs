//! Sitestock Equipment Tracking Server
//!
//! A REST JSON API for construction-site equipment inventories: supervisors
//! and admins sign in through the hosted auth provider, browse per-site
//! stock, and move equipment through request and transfer workflows.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
