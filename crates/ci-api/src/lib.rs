//! REST layer for driving the CI server under test
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  POST /app/rest/...  ┌─────────────────┐
//! │  ApiClient   │ ───────────────────► │  server under   │
//! │  (Transport) │ ◄─────────────────── │  test           │
//! └──────┬───────┘     ApiResponse      └─────────────────┘
//!        │ success + id/username
//!        ▼
//! ┌──────────────┐   teardown: cleanup_all()
//! │EntityRegistry│ ──► DELETE per entity (concurrent)
//! └──────────────┘
//! ```
//!
//! [`TestContext`] bundles configuration, client, registry and fixture
//! generator, and guarantees teardown runs after every test body.

pub mod cleanup;
pub mod client;
pub mod config;
pub mod context;
pub mod endpoints;
pub mod error;
pub mod logging;
pub mod retry;

pub use cleanup::{classify_entity, created_identifier, CreatedIdentifier};
pub use client::{ApiClient, ApiResponse, RequestOptions, Transport};
pub use config::{ConfigError, Credentials, HarnessConfig};
pub use context::TestContext;
pub use error::{ApiError, ApiResult};
pub use logging::init_test_tracing;
pub use retry::RetryPolicy;
