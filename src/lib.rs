//! Monthly attendance engine
//!
//! This crate classifies every calendar day of a month for every employee
//! from time-clock punches, leave records and work-location assignments,
//! splits worked time into regular and overtime tiers, and aggregates the
//! days into per-employee monthly summaries with a discipline score.
//!
//! The pipeline runs in three passes: [`ingest`] normalizes the raw tables,
//! [`calculation`] resolves leave and classifies days, then aggregates the
//! month. [`api`] exposes the whole run over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
