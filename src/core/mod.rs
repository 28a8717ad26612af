// IdeDoctor - core/mod.rs
//
// Core business logic layer: parsing, correlation, checks, reporting.
// Must NOT depend on: app or platform. Readers and writers are passed in.

pub mod aggregator;
pub mod blame;
pub mod checks;
pub mod log_parser;
pub mod model;
pub mod report;
pub mod vmoptions;
