//! Errors raised by the world lifecycle.

use thiserror::Error;

use crate::location::RegistrationSite;

/// Errors raised while registering world factories or running a world.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorldError {
    /// A second world factory was registered.
    #[error(
        "A world factory can only be registered once, but it is registered in 2 places:\n\n{first}\n{second}\n\nUse world modules to extend the world instead."
    )]
    MultipleFactories {
        /// Site of the factory already registered.
        first: RegistrationSite,
        /// Site of the rejected factory.
        second: RegistrationSite,
    },
    /// The registered factory produced no world.
    #[error("World factory returned no world.\n{}", .site.backtrace_line("World"))]
    Absent {
        /// Where the factory was registered.
        site: RegistrationSite,
    },
    /// The registered factory panicked.
    #[error("World factory panicked: {message}\n{}", .site.backtrace_line("World"))]
    FactoryPanicked {
        /// Where the factory was registered.
        site: RegistrationSite,
        /// The panic message.
        message: String,
    },
    /// A scenario is already running against this manager.
    #[error("a scenario is already active; end it before beginning another")]
    ScenarioActive,
    /// The world passed to `end_scenario` was not begun by that manager.
    #[error("world was not begun by this manager")]
    ForeignWorld,
    /// The world was used before being bound to an orchestrator.
    #[error("world is not bound to an orchestrator")]
    NotBound,
    /// The world holds no state of the requested type.
    #[error("world has no state of type {0}")]
    MissingState(&'static str),
    /// Soft assertions failed during the scenario.
    #[error("{} assertion(s) failed:\n{}", .0.len(), .0.join("\n"))]
    SoftAssertions(Vec<String>),
}
