//! Per-test context and lifecycle hooks

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use ci_fixtures::{FixtureGenerator, FixtureKind, FixtureRecord};
use ci_registry::{CleanupReport, EntityRegistry};
use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{ApiClient, ApiResult, HarnessConfig};

/// Everything a test needs to talk to the server and clean up after itself
///
/// Build one per test worker. [`TestContext::setup`] must run before each
/// test body and [`TestContext::teardown`] after it; [`TestContext::run`]
/// does both.
pub struct TestContext {
    config: HarnessConfig,
    registry: Arc<EntityRegistry>,
    client: ApiClient,
    fixtures: Mutex<FixtureGenerator>,
}

impl TestContext {
    /// Create a context with a fresh registry
    pub fn new(config: HarnessConfig) -> ApiResult<Self> {
        let registry = Arc::new(EntityRegistry::new());
        let client = ApiClient::new(&config, registry.clone())?;
        Ok(Self {
            config,
            registry,
            client,
            fixtures: Mutex::new(FixtureGenerator::new()),
        })
    }

    /// Create a context configured from the environment
    pub fn from_env() -> ApiResult<Self> {
        Self::new(HarnessConfig::from_env()?)
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// Generate a fixture record
    pub fn generate(&self, kind: FixtureKind, overrides: Option<Map<String, Value>>) -> FixtureRecord {
        self.fixtures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate(kind, overrides)
    }

    /// Run `f` with exclusive access to the fixture generator
    pub fn with_fixtures<T>(&self, f: impl FnOnce(&mut FixtureGenerator) -> T) -> T {
        f(&mut self.fixtures.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Start a test from a clean slate
    pub fn setup(&self) {
        self.registry.clear();
    }

    /// Delete everything the test created
    pub async fn teardown(&self) -> CleanupReport {
        self.registry.cleanup_all().await
    }

    /// Run a test body between [`TestContext::setup`] and
    /// [`TestContext::teardown`]
    ///
    /// Teardown runs whether the body succeeds, fails or panics; a panic is
    /// resumed once cleanup has finished.
    pub async fn run<'a, F, Fut, T, E>(&'a self, body: F) -> Result<T, E>
    where
        F: FnOnce(&'a TestContext) -> Fut,
        Fut: Future<Output = Result<T, E>> + 'a,
    {
        self.setup();
        let outcome = AssertUnwindSafe(body(self)).catch_unwind().await;
        let report = self.teardown().await;
        if !report.is_clean() {
            warn!(
                failed = report.failures().count(),
                "Some entities could not be cleaned up"
            );
        }

        match outcome {
            Ok(result) => result,
            Err(panic) => panic::resume_unwind(panic),
        }
    }
}
