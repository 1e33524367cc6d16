//! Read-only access to the scanner's shared `SQLite` result store.

pub mod db;
pub mod result_store;
