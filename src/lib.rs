#![forbid(unsafe_code)]

//! Bridge that lets an MCP agent drive long-running reconnaissance scanners
//! and query their results.

pub mod config;
pub mod errors;
pub mod format;
pub mod jobs;
pub mod mcp;
pub mod models;
pub mod persistence;
pub mod probe;
pub mod report;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
