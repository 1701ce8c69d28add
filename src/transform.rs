//! Argument transforms.
//!
//! A transform converts a captured argument before the step body sees it. For
//! each argument the registered transforms are tried in registration order and
//! the first whose pattern matches the *whole* argument wins; arguments no
//! transform accepts pass through as [`Value::Text`].

use std::{fmt, sync::Arc};

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::{
    error::PatternError,
    location::RegistrationSite,
    metrics::{self, RegistrationKind},
    panic::catch_body_panic,
    step::{BoxError, StepArgument},
    value::Value,
};

/// Conversion body of a transform.
///
/// Receives the transform pattern's capture groups, or the whole argument
/// when the pattern has none.
pub type TransformFn = dyn Fn(&[&str]) -> Result<Value, BoxError> + Send + Sync;

/// A transform body failed on one argument.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("transform {pattern:?} failed on argument {position}: {message}")]
pub struct TransformError {
    position: usize,
    pattern: String,
    message: String,
}

impl TransformError {
    /// Zero-based position of the argument in the step's argument list.
    #[must_use]
    pub fn position(&self) -> usize { self.position }

    /// Source of the failing transform's pattern.
    #[must_use]
    pub fn pattern(&self) -> &str { &self.pattern }

    /// The body's error or panic message.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }
}

/// A registered pattern-to-conversion rule.
pub struct Transform {
    source: String,
    regex: Regex,
    body: Arc<TransformFn>,
    site: RegistrationSite,
}

impl Transform {
    /// Pattern source as registered.
    #[must_use]
    pub fn pattern(&self) -> &str { &self.source }

    /// Where the transform was registered.
    #[must_use]
    pub fn site(&self) -> RegistrationSite { self.site }

    /// Whether the pattern matches the whole of `argument`.
    #[must_use]
    pub fn matches(&self, argument: &str) -> bool { self.regex.is_match(argument) }

    fn invoke(&self, argument: &str) -> Option<Result<Value, String>> {
        let captures = self.regex.captures(argument)?;
        let groups: Vec<&str> = if self.regex.captures_len() > 1 {
            captures
                .iter()
                .skip(1)
                .map(|group| group.map_or("", |m| m.as_str()))
                .collect()
        } else {
            vec![argument]
        };
        let outcome = catch_body_panic(|| (self.body)(&groups))
            .and_then(|result| result.map_err(|e| e.to_string()));
        Some(outcome)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("pattern", &self.source)
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of transforms.
#[derive(Debug, Default)]
pub struct TransformEngine {
    transforms: Vec<Arc<Transform>>,
}

impl TransformEngine {
    /// Register a transform, attributing it to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if `pattern` does not compile.
    #[track_caller]
    pub fn register<F>(&mut self, pattern: &str, body: F) -> Result<Arc<Transform>, PatternError>
    where
        F: Fn(&[&str]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.register_at(pattern, Arc::new(body), RegistrationSite::caller())
    }

    /// Register a transform attributed to `site`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if `pattern` does not compile.
    pub fn register_at(
        &mut self,
        pattern: &str,
        body: Arc<TransformFn>,
        site: RegistrationSite,
    ) -> Result<Arc<Transform>, PatternError> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|source| PatternError::new(pattern, source))?;
        let transform = Arc::new(Transform {
            source: pattern.to_owned(),
            regex,
            body,
            site,
        });
        self.transforms.push(Arc::clone(&transform));
        metrics::inc_registrations(RegistrationKind::Transform);
        debug!(pattern, %site, "registered transform");
        Ok(transform)
    }

    /// Convert every argument.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransformError`], naming the argument position and
    /// the transform that failed.
    pub fn apply(&self, arguments: &[StepArgument]) -> Result<Vec<Value>, TransformError> {
        arguments
            .iter()
            .enumerate()
            .map(|(position, argument)| match argument.value() {
                Some(raw) => self.apply_one(position, raw),
                None => Ok(Value::Missing),
            })
            .collect()
    }

    /// Convert a single argument at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the first matching transform fails.
    pub fn apply_one(&self, position: usize, raw: &str) -> Result<Value, TransformError> {
        for transform in &self.transforms {
            if let Some(outcome) = transform.invoke(raw) {
                return outcome.map_err(|message| TransformError {
                    position,
                    pattern: transform.source.clone(),
                    message,
                });
            }
        }
        Ok(Value::Text(raw.to_owned()))
    }

    /// Registered transforms in order.
    #[must_use]
    pub fn transforms(&self) -> &[Arc<Transform>] { &self.transforms }

    /// Number of registered transforms.
    #[must_use]
    pub fn len(&self) -> usize { self.transforms.len() }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.transforms.is_empty() }
}
