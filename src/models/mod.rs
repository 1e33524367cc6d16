//! Domain models.

pub mod job;
pub mod scanner;
pub mod target;
