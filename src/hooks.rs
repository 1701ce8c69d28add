//! Phase hooks run around scenarios and steps.
//!
//! [`HookScheduler`] only *selects* hooks: given a phase and a scenario's
//! tags it returns the applicable [`Hook`]s in registration order. Running
//! them and aggregating their failures is the orchestrator's job.

use std::{collections::HashMap, fmt, sync::Arc};

use tracing::debug;

use crate::{
    collaborators::ScenarioNode,
    location::RegistrationSite,
    metrics::{self, RegistrationKind},
    panic::catch_body_panic,
    step::{StepFailure, StepResult},
    tags::{TagExpression, TagExpressionError},
    world::World,
};

/// Point in the scenario lifecycle at which a hook runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// Before the first step of a scenario.
    BeforeScenario,
    /// After the last step of a scenario.
    AfterScenario,
    /// Before each step.
    BeforeStep,
    /// After each step.
    AfterStep,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookPhase::BeforeScenario => "Before",
            HookPhase::AfterScenario => "After",
            HookPhase::BeforeStep => "BeforeStep",
            HookPhase::AfterStep => "AfterStep",
        })
    }
}

/// Type alias for a hook body.
pub type HookFn = dyn Fn(&mut World, &dyn ScenarioNode) -> StepResult + Send + Sync;

/// A registered hook.
pub struct Hook {
    phase: HookPhase,
    tags: TagExpression,
    body: Arc<HookFn>,
    site: RegistrationSite,
}

impl Hook {
    /// Phase the hook belongs to.
    #[must_use]
    pub fn phase(&self) -> HookPhase { self.phase }

    /// Tag predicate gating the hook.
    #[must_use]
    pub fn tag_expression(&self) -> &TagExpression { &self.tags }

    /// Where the hook was registered.
    #[must_use]
    pub fn site(&self) -> RegistrationSite { self.site }

    /// Whether the hook applies to a scenario with `tags`.
    #[must_use]
    pub fn accepts<S: AsRef<str>>(&self, tags: &[S]) -> bool { self.tags.accepts(tags) }

    /// Run the hook body. A panic fails the hook.
    ///
    /// # Errors
    ///
    /// Returns whatever the body reports, or [`StepFailure::Panicked`].
    pub fn invoke(&self, world: &mut World, scenario: &dyn ScenarioNode) -> StepResult {
        catch_body_panic(|| (self.body)(world, scenario))
            .unwrap_or_else(|panic| Err(StepFailure::Panicked(panic)))
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("phase", &self.phase)
            .field("tags", &self.tags.to_string())
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

/// Stores hooks per phase in registration order.
#[derive(Debug, Default)]
pub struct HookScheduler {
    hooks: HashMap<HookPhase, Vec<Arc<Hook>>>,
}

impl HookScheduler {
    /// Register a hook, attributing it to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TagExpressionError`] if `tags` is malformed; nothing is
    /// registered in that case.
    #[track_caller]
    pub fn register<S, F>(
        &mut self,
        phase: HookPhase,
        tags: &[S],
        body: F,
    ) -> Result<Arc<Hook>, TagExpressionError>
    where
        S: AsRef<str>,
        F: Fn(&mut World, &dyn ScenarioNode) -> StepResult + Send + Sync + 'static,
    {
        self.register_at(phase, tags, Arc::new(body), RegistrationSite::caller())
    }

    /// Register a hook attributed to `site`.
    ///
    /// # Errors
    ///
    /// Returns [`TagExpressionError`] if `tags` is malformed.
    pub fn register_at<S: AsRef<str>>(
        &mut self,
        phase: HookPhase,
        tags: &[S],
        body: Arc<HookFn>,
        site: RegistrationSite,
    ) -> Result<Arc<Hook>, TagExpressionError> {
        let tags = TagExpression::parse(tags)?;
        debug!(%phase, tags = %tags, %site, "registered hook");
        let hook = Arc::new(Hook {
            phase,
            tags,
            body,
            site,
        });
        self.hooks.entry(phase).or_default().push(Arc::clone(&hook));
        metrics::inc_registrations(RegistrationKind::Hook);
        Ok(hook)
    }

    /// Hooks of `phase` accepting `scenario_tags`, in registration order.
    #[must_use]
    pub fn applicable<S: AsRef<str>>(&self, phase: HookPhase, scenario_tags: &[S]) -> Vec<Arc<Hook>> {
        self.hooks
            .get(&phase)
            .map(|hooks| {
                hooks
                    .iter()
                    .filter(|hook| hook.accepts(scenario_tags))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of hooks registered for `phase`.
    #[must_use]
    pub fn count(&self, phase: HookPhase) -> usize { self.hooks.get(&phase).map_or(0, Vec::len) }

    /// Remove every hook.
    pub fn clear(&mut self) { self.hooks.clear(); }
}
