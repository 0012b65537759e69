//! Fixture generator

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use serde_json::{Map, Value};
use tracing::trace;

use crate::{
    BuildTypeFixture, Clock, Fixture, FixtureKind, FixtureRecord, GenerationResult,
    ProjectFixture, ProjectLocator, ProjectRef, ServerFixture, SystemClock, UserFixture,
    ROOT_PROJECT_LOCATOR,
};

/// Words used for human-readable names
const NAME_WORDS: &[&str] = &[
    "alpha", "bravo", "cobalt", "delta", "ember", "falcon", "granite", "harbor", "indigo",
    "juniper", "kestrel", "lumen", "meadow", "nimbus", "onyx", "pioneer", "quartz", "raven",
    "summit", "tundra",
];

/// Server version reported by generated server-info stubs
const STUB_VERSION_MAJOR: u32 = 2024;
const STUB_VERSION_MINOR: u32 = 12;
const STUB_BUILD_NUMBER: &str = "174331";

/// Timestamp format used by the server's REST API
const SERVER_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%z";

/// Produces uniquely identified fixture records
///
/// Identifiers look like `Project_<micros>_<hex>`. The timestamp part is
/// forced to increase on every call, so a frozen clock still yields distinct
/// values, and the 32-bit random suffix separates generators running in
/// different processes at the same instant.
pub struct FixtureGenerator<C = SystemClock, R = StdRng> {
    clock: C,
    rng: R,
    last_micros: i64,
}

impl FixtureGenerator {
    /// A generator backed by the system clock and an entropy-seeded RNG
    pub fn new() -> Self {
        Self::with_sources(SystemClock, StdRng::from_entropy())
    }
}

impl Default for FixtureGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, R: RngCore> FixtureGenerator<C, R> {
    /// A generator with explicit clock and random source
    pub fn with_sources(clock: C, rng: R) -> Self {
        Self {
            clock,
            rng,
            last_micros: i64::MIN,
        }
    }

    /// Generate a record of the given kind, applying `overrides` on top
    pub fn generate(&mut self, kind: FixtureKind, overrides: Option<Map<String, Value>>) -> FixtureRecord {
        let overrides = overrides.unwrap_or_default();
        let fixture = match kind {
            FixtureKind::Project => Fixture::Project(self.project()),
            FixtureKind::BuildType => {
                // Only synthesize a parent reference when the caller did not supply one
                let project_id = if overrides.contains_key("project") {
                    String::new()
                } else {
                    self.unique_id("Project")
                };
                Fixture::BuildType(self.build_type(&project_id))
            }
            FixtureKind::User => Fixture::User(self.user()),
            FixtureKind::Server => Fixture::Server(self.server()),
        };

        let mut record = fixture.into_record();
        record.merge_shallow(overrides);
        trace!(kind = %kind, id = ?record.identifier(), "Generated fixture");
        record
    }

    /// Generate a record for a kind given by its REST name
    ///
    /// Fails with [`crate::GenerationError::UnsupportedKind`] for names the
    /// generator does not know.
    pub fn generate_named(
        &mut self,
        kind: &str,
        overrides: Option<Map<String, Value>>,
    ) -> GenerationResult<FixtureRecord> {
        let kind: FixtureKind = kind.parse()?;
        Ok(self.generate(kind, overrides))
    }

    /// A project parented to the root project
    pub fn project(&mut self) -> ProjectFixture {
        let id = self.unique_id("Project");
        let name = self.unique_name();
        ProjectFixture {
            description: format!("Generated project {}", name),
            id,
            name,
            parent_project: ProjectLocator {
                locator: ROOT_PROJECT_LOCATOR.to_string(),
            },
        }
    }

    /// A build type inside the project with id `project_id`
    pub fn build_type(&mut self, project_id: &str) -> BuildTypeFixture {
        let id = self.unique_id("BuildType");
        let name = self.unique_name();
        BuildTypeFixture {
            description: format!("Generated build configuration {}", name),
            id,
            name,
            project: ProjectRef {
                id: project_id.to_string(),
            },
        }
    }

    /// A user with a random password
    pub fn user(&mut self) -> UserFixture {
        let username = self.unique_id("user").to_lowercase();
        let password = format!("{:08x}{:08x}", self.rng.next_u32(), self.rng.next_u32());
        UserFixture {
            email: format!("{}@example.com", username),
            name: self.unique_name(),
            username,
            password,
        }
    }

    /// A server-info stub stamped with the current time
    pub fn server(&mut self) -> ServerFixture {
        let now = self.clock.now();
        let internal_id = self.unique_id("server");
        let time = now.format(SERVER_TIME_FORMAT).to_string();
        ServerFixture {
            version: format!(
                "{}.{} (build {})",
                STUB_VERSION_MAJOR, STUB_VERSION_MINOR, STUB_BUILD_NUMBER
            ),
            version_major: STUB_VERSION_MAJOR,
            version_minor: STUB_VERSION_MINOR,
            build_number: STUB_BUILD_NUMBER.to_string(),
            internal_id,
            role: "main_node".to_string(),
            web_url: "http://localhost:8111".to_string(),
            start_time: time.clone(),
            current_time: time,
        }
    }

    /// `<prefix>_<micros>_<8 hex digits>`
    pub fn unique_id(&mut self, prefix: &str) -> String {
        let micros = self.next_micros();
        format!("{}_{}_{:08x}", prefix, micros, self.rng.next_u32())
    }

    /// `<word>_<micros>_<8 hex>`
    ///
    /// The suffix keeps names unique across generators sharing a clock.
    pub fn unique_name(&mut self) -> String {
        let word = NAME_WORDS.choose(&mut self.rng).copied().unwrap_or("fixture");
        format!("{}_{}_{:08x}", word, self.next_micros(), self.rng.next_u32())
    }

    /// The clock reading in microseconds, forced strictly above the last one used
    fn next_micros(&mut self) -> i64 {
        let now = self.clock.now().timestamp_micros();
        let micros = if now > self.last_micros {
            now
        } else {
            self.last_micros + 1
        };
        self.last_micros = micros;
        micros
    }
}
