//! Model assertions built on [`compare`]

use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::compare::{compare, display_path, ComparisonResult};
use crate::tree::Tree;
use crate::CompareOptions;

const MATCH_HEADER: &str = "Models do not match";
const CONTAINS_HEADER: &str = "Container does not contain the expected subset";
const PATTERN_HEADER: &str = "Model does not match pattern";

/// A failed model assertion, carrying the complete itemized report
#[derive(Debug, Clone, Error)]
#[error("{}", self.render())]
pub struct ComparisonFailure {
    header: &'static str,
    result: ComparisonResult,
}

impl ComparisonFailure {
    /// The comparison that caused the failure
    pub fn result(&self) -> &ComparisonResult {
        &self.result
    }

    /// The multi-section report
    pub fn report(&self) -> String {
        self.render()
    }

    fn render(&self) -> String {
        let mut out = String::from(self.header);
        if !self.result.differences.is_empty() {
            out.push_str("\nDifferences:");
            for diff in &self.result.differences {
                let _ = write!(out, "\n  - {}", diff);
            }
        }
        if !self.result.missing_fields.is_empty() {
            out.push_str("\nMissing fields:");
            for path in &self.result.missing_fields {
                let _ = write!(out, "\n  - {}", display_path(path));
            }
        }
        if !self.result.extra_fields.is_empty() {
            out.push_str("\nExtra fields:");
            for path in &self.result.extra_fields {
                let _ = write!(out, "\n  - {}", display_path(path));
            }
        }
        out
    }
}

/// Errors from [`ModelAssertion`]
#[derive(Debug, Error)]
pub enum AssertionError {
    /// The models differ
    #[error(transparent)]
    Failure(#[from] ComparisonFailure),

    /// One side could not be turned into a JSON tree
    #[error("failed to encode {side} model: {source}")]
    Encode {
        side: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Named assertions over [`Tree`] values
///
/// Each returns `Ok(())` or one [`ComparisonFailure`] listing every problem.
pub struct ModelAssertions;

impl ModelAssertions {
    /// Full equality: no differences, no missing and no extra fields
    pub fn assert_match<T: Tree>(
        expected: &T,
        actual: &T,
        options: &CompareOptions,
    ) -> Result<(), ComparisonFailure> {
        let result = compare(expected, actual, options);
        if result.success {
            Ok(())
        } else {
            Err(ComparisonFailure {
                header: MATCH_HEADER,
                result,
            })
        }
    }

    /// `container` holds everything in `subset`; extra container fields are fine
    pub fn assert_contains<T: Tree>(
        container: &T,
        subset: &T,
        options: &CompareOptions,
    ) -> Result<(), ComparisonFailure> {
        let mut result = compare(subset, container, options);
        if result.differences.is_empty() && result.missing_fields.is_empty() {
            Ok(())
        } else {
            // Extra container fields are allowed, so they are not part of the failure
            result.extra_fields.clear();
            Err(ComparisonFailure {
                header: CONTAINS_HEADER,
                result,
            })
        }
    }

    /// Same checks as [`ModelAssertions::assert_match`]
    pub fn assert_matches_pattern<T: Tree>(
        actual: &T,
        pattern: &T,
        options: &CompareOptions,
    ) -> Result<(), ComparisonFailure> {
        let result = compare(pattern, actual, options);
        if result.success {
            Ok(())
        } else {
            Err(ComparisonFailure {
                header: PATTERN_HEADER,
                result,
            })
        }
    }
}

/// Start an assertion between any two serializable models
///
/// `expected` is typically the request fixture and `actual` the response
/// body the server returned for it.
pub fn assert_that_models<'a, E, A>(expected: &'a E, actual: &'a A) -> ModelAssertion<'a, E, A>
where
    E: Serialize + ?Sized,
    A: Serialize + ?Sized,
{
    ModelAssertion { expected, actual }
}

/// A pending assertion created by [`assert_that_models`]
pub struct ModelAssertion<'a, E: ?Sized, A: ?Sized> {
    expected: &'a E,
    actual: &'a A,
}

impl<E, A> ModelAssertion<'_, E, A>
where
    E: Serialize + ?Sized,
    A: Serialize + ?Sized,
{
    /// Both models are structurally equal
    pub fn matches(&self, options: &CompareOptions) -> Result<(), AssertionError> {
        let (expected, actual) = self.encode()?;
        Ok(ModelAssertions::assert_match(&expected, &actual, options)?)
    }

    /// The actual model contains everything in the expected one
    pub fn contains(&self, options: &CompareOptions) -> Result<(), AssertionError> {
        let (expected, actual) = self.encode()?;
        Ok(ModelAssertions::assert_contains(&actual, &expected, options)?)
    }

    /// The actual model matches the expected one used as a pattern
    pub fn matches_pattern(&self, options: &CompareOptions) -> Result<(), AssertionError> {
        let (expected, actual) = self.encode()?;
        Ok(ModelAssertions::assert_matches_pattern(&actual, &expected, options)?)
    }

    fn encode(&self) -> Result<(Value, Value), AssertionError> {
        let expected = serde_json::to_value(self.expected).map_err(|source| AssertionError::Encode {
            side: "expected",
            source,
        })?;
        let actual = serde_json::to_value(self.actual).map_err(|source| AssertionError::Encode {
            side: "actual",
            source,
        })?;
        Ok((expected, actual))
    }
}
