//! MCP tool handlers.
//!
//! Each tool exposes `handle`, which adapts the protocol call, and `run`,
//! which holds the behavior and is called directly by tests.

pub mod launch_scan;
pub mod list_jobs;
pub mod list_schema;
pub mod probe_status;
pub mod read_report;
pub mod run_query;
pub mod util;
