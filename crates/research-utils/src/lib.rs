//! Shared utilities for research-agent
//!
//! This crate provides the ambient pieces used across the workspace:
//! tracing setup and application metadata.

pub mod config;
pub mod logging;

pub use config::AppInfo;
pub use logging::{LogFormat, init_tracing, init_tracing_with};
