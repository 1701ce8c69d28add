//! Append-only registry of pattern step definitions.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use regex::Regex;
use tracing::debug;

use super::{StepBody, StepDefinition, StepMatch, StepOptions};
use crate::{
    error::PatternError,
    location::RegistrationSite,
    metrics::{self, RegistrationKind},
};

/// Stores pattern step definitions in registration order.
///
/// Registration performs no conflict checks: overlapping patterns are legal
/// and only surface when [`StepRegistry::match_all`] returns several matches.
/// Deciding what to do about that is left to the caller.
#[derive(Debug, Default)]
pub struct StepRegistry {
    definitions: Vec<Arc<StepDefinition>>,
    invoked: Vec<AtomicBool>,
}

impl StepRegistry {
    /// Register a definition, attributing it to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if `pattern` is not a valid regular
    /// expression. The registry is left unchanged.
    #[track_caller]
    pub fn register(
        &mut self,
        pattern: &str,
        body: StepBody,
        options: StepOptions,
    ) -> Result<Arc<StepDefinition>, PatternError> {
        self.register_at(pattern, body, options, RegistrationSite::caller())
    }

    /// Register a definition attributed to `site`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if `pattern` is not a valid regular
    /// expression. The registry is left unchanged.
    pub fn register_at(
        &mut self,
        pattern: &str,
        body: StepBody,
        options: StepOptions,
        site: RegistrationSite,
    ) -> Result<Arc<StepDefinition>, PatternError> {
        let regex = Regex::new(pattern).map_err(|source| PatternError::new(pattern, source))?;
        let definition = Arc::new(StepDefinition::new(
            self.definitions.len(),
            regex,
            body,
            options,
            site,
        ));
        self.definitions.push(Arc::clone(&definition));
        self.invoked.push(AtomicBool::new(false));
        metrics::inc_registrations(RegistrationKind::StepDefinition);
        debug!(pattern, %site, "registered step definition");
        Ok(definition)
    }

    /// Match `name_to_match` against every definition.
    ///
    /// Every matching definition is returned, in registration order.
    /// `name_to_format` is the text later shown to the user and defaults to
    /// `name_to_match`.
    #[must_use]
    pub fn match_all(&self, name_to_match: &str, name_to_format: Option<&str>) -> Vec<StepMatch> {
        self.definitions
            .iter()
            .filter_map(|definition| {
                definition.arguments_from(name_to_match).map(|arguments| {
                    StepMatch::new(
                        Arc::clone(definition),
                        name_to_match,
                        name_to_format,
                        arguments,
                    )
                })
            })
            .collect()
    }

    /// All definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> &[Arc<StepDefinition>] { &self.definitions }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize { self.definitions.len() }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.definitions.is_empty() }

    /// Record that `definition` has been invoked.
    pub fn mark_invoked(&self, definition: &StepDefinition) {
        if let Some(flag) = self.invoked.get(definition.id()) {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Definitions that have never been invoked, in registration order.
    #[must_use]
    pub fn unused(&self) -> Vec<Arc<StepDefinition>> {
        self.definitions
            .iter()
            .zip(&self.invoked)
            .filter(|(_, flag)| !flag.load(Ordering::Relaxed))
            .map(|(definition, _)| Arc::clone(definition))
            .collect()
    }
}
