//! nagrik-core - Core library for Nagrik
//!
//! This crate contains the report models, the durable offline draft store,
//! the sync engine and connectivity monitor, and the authoring and status
//! services shared by the Nagrik CLI and API server.

pub mod auth;
pub mod config;
pub mod connectivity;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{DraftReport, DraftStatus, IssueCategory, ReportId};
pub use services::DraftStore;
pub use sync::SyncEngine;
