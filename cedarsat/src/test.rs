//! Shortcuts for the formula generators used in tests.
pub use cedarsat_formula::test::{pigeon_hole_formula, sat_formula, unsat_cycles_formula};
