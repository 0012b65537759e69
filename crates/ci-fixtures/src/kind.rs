//! Fixture kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GenerationError;

/// The closed set of fixture kinds the generator can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixtureKind {
    /// A project
    Project,
    /// A build configuration, always parented to a project
    BuildType,
    /// A user account
    User,
    /// A stub of the server information endpoint
    Server,
}

impl FixtureKind {
    /// All kinds, in declaration order
    pub const ALL: [FixtureKind; 4] = [
        FixtureKind::Project,
        FixtureKind::BuildType,
        FixtureKind::User,
        FixtureKind::Server,
    ];

    /// The REST name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureKind::Project => "project",
            FixtureKind::BuildType => "buildType",
            FixtureKind::User => "user",
            FixtureKind::Server => "server",
        }
    }

    /// The field that uniquely identifies a record of this kind
    pub fn identifying_field(&self) -> &'static str {
        match self {
            FixtureKind::Project | FixtureKind::BuildType => "id",
            FixtureKind::User => "username",
            FixtureKind::Server => "internalId",
        }
    }
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixtureKind {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixtureKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GenerationError::UnsupportedKind {
                kind: s.to_string(),
            })
    }
}
