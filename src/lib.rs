//! Algorithm Regression Harness Library
//!
//! Exposes the regression harness for the `regression_run` binary and for tests.

pub mod regression;
