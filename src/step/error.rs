//! Invocation-time failures.
//!
//! These errors fail a single step (or hook) and are recorded by the
//! orchestrator against the running scenario; they never abort a run.

use thiserror::Error;

use crate::{sequence::SequenceError, transform::TransformError, world::WorldError};

/// Boxed error returned by plugin code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of running a step, hook, or nested step invocation.
pub type StepResult = Result<(), StepFailure>;

/// Reasons a step fails.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepFailure {
    /// The body reported a failure.
    #[error("{0}")]
    Failed(String),
    /// The body asked for the step to be marked pending.
    #[error("pending: {}", .0.as_deref().unwrap_or("TODO"))]
    Pending(Option<String>),
    /// A strict assertion failed.
    #[error("assertion failed: {0}")]
    Assertion(String),
    /// The body panicked.
    #[error("step panicked: {0}")]
    Panicked(String),
    /// A named body refers to a method the world does not provide.
    #[error("world has no method named {0:?}")]
    UnknownMethod(String),
    /// The body declared a different number of arguments than the step
    /// supplied.
    #[error("step expects {expected} argument(s) but {actual} were supplied")]
    Arity {
        /// Arguments the body declared.
        expected: usize,
        /// Captures plus the multiline argument, if any.
        actual: usize,
    },
    /// An argument transform failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// A sequence lookup or parameter parse failed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    /// A nested step could not be resolved.
    #[error(transparent)]
    Match(#[from] MatchError),
    /// The world is missing state the step needs.
    #[error(transparent)]
    World(#[from] WorldError),
    /// Any other error raised by plugin code.
    #[error(transparent)]
    Other(BoxError),
}

impl StepFailure {
    /// Wrap an arbitrary error raised by step code.
    pub fn other(error: impl Into<BoxError>) -> Self { StepFailure::Other(error.into()) }

    /// Whether this failure marks the step pending rather than failed.
    #[must_use]
    pub fn is_pending(&self) -> bool { matches!(self, StepFailure::Pending(_)) }
}

/// Failure to select a single step definition for a step name.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchError {
    /// No definition matched.
    #[error("undefined step: {name:?}")]
    Undefined {
        /// The step text.
        name: String,
    },
    /// More than one definition matched.
    #[error(
        "ambiguous match of {name:?}:\n\n{}\n\nSelect the guess match policy to pick the closest candidate instead",
        .candidates.join("\n")
    )]
    Ambiguous {
        /// The step text.
        name: String,
        /// Every matching definition, rendered as `pattern  # site`.
        candidates: Vec<String>,
    },
}
