//! Encoder test module
//!
//! Cross-stage integration tests, property-based invariant tests, and the
//! scenario suite exercising canonical input signals end to end.

pub mod scenario_tests;
