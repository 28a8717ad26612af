// IdeDoctor - app/mod.rs
//
// Application layer: orchestration and collaborator boundaries.
// Dependencies: core, platform.

pub mod diagnose;
pub mod plugins;
