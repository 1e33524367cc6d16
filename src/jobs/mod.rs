//! Scanner job lifecycle: registry, detached spawning, launching, self-test.

pub mod launcher;
pub mod registry;
pub mod spawner;
