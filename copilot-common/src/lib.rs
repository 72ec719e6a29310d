//! # Sales Copilot Common Library
//!
//! Shared code for the Sales Copilot services including:
//! - Lead and company models with input validation
//! - Record store access (leads and companies tables)
//! - CSV import pipeline
//! - Configuration loading

pub mod config;
pub mod csv_import;
pub mod db;
pub mod error;
pub mod models;
pub mod validation;

pub use error::{Error, Result};
pub use models::{Company, Lead, NewCompany, NewLead};
pub use validation::FieldErrors;
