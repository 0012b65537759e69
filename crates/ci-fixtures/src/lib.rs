//! Fixture generation for CI server test runs
//!
//! Every fixture is a fresh, uniquely identified record that a test can post
//! to the server's REST API. Identifying fields are built from a monotonic
//! timestamp plus random entropy, so two records generated in the same
//! process never share an id.
//!
//! The generator performs no I/O. The clock and the random source are
//! injectable so tests can pin the output.

mod clock;
mod error;
mod fixture;
mod generator;
mod kind;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{GenerationError, GenerationResult};
pub use fixture::{
    BuildTypeFixture, Fixture, FixtureRecord, ProjectFixture, ProjectLocator, ProjectRef,
    ServerFixture, UserFixture,
};
pub use generator::FixtureGenerator;
pub use kind::FixtureKind;

/// Locator of the root project every generated project is parented to
pub const ROOT_PROJECT_LOCATOR: &str = "_Root";
