//! Checksum driver for fixedwidth-rs.
//!
//! Generates the deterministic fixture file, parses it with one or every
//! strategy combination, and compares the totals with the expected value.

pub mod fixture;
pub mod runner;

pub use fixture::{ensure_fixture, expected_repeated_digit_total, write_fixture};
pub use runner::{RunError, StrategyRun, check_agreement, run_all, run_one};
