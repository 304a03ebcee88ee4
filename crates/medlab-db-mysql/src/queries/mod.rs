//! SQL query implementations, one module per API surface area.
//!
//! Mutations run inside a single transaction that also carries their
//! activity-log entry, so a failure partway leaves no partial state.

pub mod activity;
pub mod catalog;
pub mod dashboard;
pub mod doctors;
pub mod orders;
pub mod patients;
pub mod reports;
pub mod settings;
