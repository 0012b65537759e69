//! Structural comparison of API payloads
//!
//! [`compare`] walks an expected and an actual tree in lock-step and reports
//! every value difference, every field the actual side is missing, and every
//! field it has in excess. [`ModelAssertions`] turns a comparison into a
//! single pass/fail outcome with a readable report.
//!
//! ```text
//!  expected ──┐
//!             ├──► compare() ──► ComparisonResult ──► ModelAssertions ──► Ok / ComparisonFailure
//!  actual ────┘        ▲
//!                      │
//!               CompareOptions
//! ```
//!
//! Inputs are anything implementing [`Tree`]; `serde_json::Value` and
//! `Option<T>` (for values that may be undefined) are supported out of the box.
//! Owned trees cannot contain cycles, so no cycle detection is performed.

pub mod assert;
pub mod compare;
pub mod options;
pub mod tree;

pub use assert::{assert_that_models, AssertionError, ComparisonFailure, ModelAssertion, ModelAssertions};
pub use compare::{compare, ComparisonResult, DiffCategory, Difference};
pub use options::CompareOptions;
pub use tree::{Number, Tree, View};
