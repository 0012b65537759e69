//! Typed fixtures and their loosely-typed record view

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{FixtureKind, GenerationError, GenerationResult};

/// Reference to the parent of a new project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLocator {
    pub locator: String,
}

/// Reference to the project a build type lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
}

/// Body of a create-project call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFixture {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parent_project: ProjectLocator,
}

/// Body of a create-build-type call
///
/// The referenced project is not created by the generator. Callers create
/// the parent before posting the build type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTypeFixture {
    pub id: String,
    pub name: String,
    pub description: String,
    pub project: ProjectRef,
}

/// Body of a create-user call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFixture {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Stand-in for the server information payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFixture {
    pub version: String,
    pub version_major: u32,
    pub version_minor: u32,
    pub build_number: String,
    pub internal_id: String,
    pub role: String,
    pub web_url: String,
    pub start_time: String,
    pub current_time: String,
}

/// A fixture of any kind, with its kind-specific field set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Fixture {
    Project(ProjectFixture),
    BuildType(BuildTypeFixture),
    User(UserFixture),
    Server(ServerFixture),
}

impl Fixture {
    /// The kind of this fixture
    pub fn kind(&self) -> FixtureKind {
        match self {
            Fixture::Project(_) => FixtureKind::Project,
            Fixture::BuildType(_) => FixtureKind::BuildType,
            Fixture::User(_) => FixtureKind::User,
            Fixture::Server(_) => FixtureKind::Server,
        }
    }

    /// The value of the identifying field
    pub fn identifier(&self) -> &str {
        match self {
            Fixture::Project(p) => &p.id,
            Fixture::BuildType(b) => &b.id,
            Fixture::User(u) => &u.username,
            Fixture::Server(s) => &s.internal_id,
        }
    }

    /// Convert into the loosely-typed record view
    pub fn into_record(self) -> FixtureRecord {
        let kind = self.kind();
        let fields = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // Every variant serializes to a JSON object of plain strings and integers
            other => {
                debug_assert!(false, "{} fixture did not serialize to an object: {:?}", kind, other);
                Map::new()
            }
        };
        FixtureRecord { kind, fields }
    }
}

/// A generated record: field name to JSON value, tagged with its kind
///
/// Serializes as the bare field map, so it can be posted directly.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRecord {
    kind: FixtureKind,
    fields: Map<String, Value>,
}

impl FixtureRecord {
    /// The kind this record was generated for
    pub fn kind(&self) -> FixtureKind {
        self.kind
    }

    /// All fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// A single field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The identifying field's value, if it is a string
    pub fn identifier(&self) -> Option<&str> {
        self.fields
            .get(self.kind.identifying_field())
            .and_then(Value::as_str)
    }

    /// Overwrite top-level fields
    ///
    /// A nested object in `overrides` replaces the generated object as a
    /// whole; nothing is merged below the first level.
    pub fn merge_shallow(&mut self, overrides: Map<String, Value>) {
        for (key, value) in overrides {
            self.fields.insert(key, value);
        }
    }

    /// Convert back into the typed fixture for this kind
    pub fn to_fixture(&self) -> GenerationResult<Fixture> {
        let value = Value::Object(self.fields.clone());
        let invalid = |source| GenerationError::InvalidOverride {
            kind: self.kind.as_str(),
            source,
        };
        Ok(match self.kind {
            FixtureKind::Project => Fixture::Project(serde_json::from_value(value).map_err(invalid)?),
            FixtureKind::BuildType => {
                Fixture::BuildType(serde_json::from_value(value).map_err(invalid)?)
            }
            FixtureKind::User => Fixture::User(serde_json::from_value(value).map_err(invalid)?),
            FixtureKind::Server => Fixture::Server(serde_json::from_value(value).map_err(invalid)?),
        })
    }

    /// Take the field map as a JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Serialize for FixtureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl From<Fixture> for FixtureRecord {
    fn from(fixture: Fixture) -> Self {
        fixture.into_record()
    }
}
