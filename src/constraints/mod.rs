//! Constraint rules consumed by the solvers and the executor.
//!
//! Rules are pure predicates returning `(bool, reason)`; they never fail.
//! Solvers fold rejected orders into the unassigned set instead of erroring.

mod capacity;
mod report;
mod schedule;
mod weather;

pub use capacity::{CapacityRule, CapacityUtilisation};
pub use report::{validate_run, ValidationReport};
pub use schedule::ScheduleRule;
pub use weather::{ClearSkies, StormZones, WeatherCheck};
