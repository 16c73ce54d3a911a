//! Test support utilities
//!
//! Enabled for this crate's own tests and, through the `test-utils`
//! feature, for downstream crates' tests.

pub mod mocks;

pub use mocks::{MockGraphStore, MockStoreStats};
