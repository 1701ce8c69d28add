//! Canonical error and result types for the load phase.
//!
//! Registration failures stop the load phase: continuing with a registry
//! that rejected a definition would run scenarios against an inconsistent
//! set of steps. Invocation-time failures are reported per step through
//! [`StepFailure`](crate::step::StepFailure) instead.

use thiserror::Error;

use crate::{sequence::SequenceError, tags::TagExpressionError, world::WorldError};

/// A pattern that failed to compile.
#[derive(Debug, Error)]
#[error("invalid pattern {pattern:?}: {source}")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}

impl PatternError {
    pub(crate) fn new(pattern: &str, source: regex::Error) -> Self {
        Self {
            pattern: pattern.to_owned(),
            source,
        }
    }

    /// The rejected pattern source.
    #[must_use]
    pub fn pattern(&self) -> &str { &self.pattern }
}

/// Top-level error type raised while registering definitions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LucidError {
    /// A step or transform pattern did not compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// A sequence could not be registered.
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    /// A hook's tag expression was malformed.
    #[error(transparent)]
    Tags(#[from] TagExpressionError),
    /// A world factory or module could not be registered.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Result alias used by registration APIs.
pub type Result<T> = std::result::Result<T, LucidError>;
