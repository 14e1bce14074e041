//! Configuration loading and management for the attendance engine.
//!
//! This module loads the working-time policy and the leave rule table from
//! YAML files. The resulting [`EngineConfig`] is immutable and is passed
//! explicitly into every component.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/standard").unwrap();
//! println!("{} leave rules", loader.config().leave_rules().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, IngestionPolicy, LeaveRule, LeaveRuleTable, MajorationRates, Payer,
    PayrollPolicy, PolicyConfig, PresencePolicy, SchedulePolicy, ShortVariant,
};
