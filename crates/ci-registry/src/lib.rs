//! Registry of entities created on the server during a test
//!
//! The HTTP layer hands every successfully created project, build type and
//! user to an [`EntityRegistry`] together with a callback that deletes it.
//! Test teardown drains the registry with [`EntityRegistry::cleanup_all`].
//!
//! Each test worker owns its own registry; share it within the worker as an
//! `Arc<EntityRegistry>` and call [`EntityRegistry::clear`] before each test.
//!
//! Cleanup callbacks run concurrently with no ordering between them. Deleting
//! a project also deletes its build types on the server, so the build type's
//! own callback may then fail; such failures are logged and tolerated.

mod entity;
mod registry;

pub use entity::{
    CleanupError, CleanupFuture, CleanupOutcome, CleanupResult, CleanupState, EntityKind,
    RegisteredEntity,
};
pub use registry::{CleanupReport, EntityRegistry, RegistryStats};
