pub mod analyzers;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod infra;
pub mod output;
pub mod parser;
pub mod record;
pub mod services;
pub mod simulation;
pub mod store;
pub mod timeline;

pub use error::{AnalyticsError, Result};
