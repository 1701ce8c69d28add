//! Metric helpers for `lucid`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled the helpers do nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking registrations, labelled by `kind`.
pub const REGISTRATIONS_TOTAL: &str = "lucid_registrations_total";
/// Name of the counter tracking step match resolutions, labelled by `outcome`.
pub const STEP_MATCHES_TOTAL: &str = "lucid_step_matches_total";
/// Name of the counter tracking scenarios whose world was created.
pub const SCENARIOS_STARTED: &str = "lucid_scenarios_started_total";
/// Name of the counter tracking failures to build a world.
pub const WORLD_FAILURES_TOTAL: &str = "lucid_world_failures_total";

/// Kind of definition being registered.
#[derive(Clone, Copy, Debug)]
pub enum RegistrationKind {
    /// A pattern step definition.
    StepDefinition,
    /// An exact-phrase sequence.
    Sequence,
    /// An argument transform.
    Transform,
    /// A phase hook.
    Hook,
    /// The world factory.
    WorldFactory,
    /// A world extension module.
    WorldModule,
}

impl RegistrationKind {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            RegistrationKind::StepDefinition => "step_definition",
            RegistrationKind::Sequence => "sequence",
            RegistrationKind::Transform => "transform",
            RegistrationKind::Hook => "hook",
            RegistrationKind::WorldFactory => "world_factory",
            RegistrationKind::WorldModule => "world_module",
        }
    }
}

/// Result of resolving a step name against the pattern registry.
#[derive(Clone, Copy, Debug)]
pub enum MatchOutcome {
    /// Exactly one definition was selected.
    Matched,
    /// No definition matched.
    Undefined,
    /// Several definitions matched.
    Ambiguous,
}

impl MatchOutcome {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            MatchOutcome::Matched => "matched",
            MatchOutcome::Undefined => "undefined",
            MatchOutcome::Ambiguous => "ambiguous",
        }
    }
}

/// Record a successful registration.
pub fn inc_registrations(kind: RegistrationKind) {
    #[cfg(feature = "metrics")]
    counter!(REGISTRATIONS_TOTAL, "kind" => kind.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record the outcome of a step match resolution.
pub fn inc_step_matches(outcome: MatchOutcome) {
    #[cfg(feature = "metrics")]
    counter!(STEP_MATCHES_TOTAL, "outcome" => outcome.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record a scenario whose world reached the bound state.
pub fn inc_scenarios() {
    #[cfg(feature = "metrics")]
    counter!(SCENARIOS_STARTED).increment(1);
}

/// Record a failure to create a world.
pub fn inc_world_failures() {
    #[cfg(feature = "metrics")]
    counter!(WORLD_FAILURES_TOTAL).increment(1);
}
