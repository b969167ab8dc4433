//! # Sealbox Testkit
//!
//! Shared testing utilities: pipeline fixtures with deterministic
//! recipients, a fault-injecting store double, and proptest generators.

pub mod fixtures;
pub mod flaky;
pub mod generators;

pub use fixtures::{multi_recipient_fixtures, TestFixture};
pub use flaky::FlakyStore;
