//! Source locations recorded when definitions are registered.
//!
//! Registration entry points are annotated with `#[track_caller]`, so the
//! captured [`RegistrationSite`] points at the plugin code that made the call
//! rather than at this crate. Errors that concern a registration (duplicate
//! phrases, a second world factory, a factory returning nothing) report these
//! sites so the offending code is easy to find.

use std::{fmt, panic::Location};

/// Source position of a registration call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegistrationSite(&'static Location<'static>);

impl RegistrationSite {
    /// Capture the location of the caller.
    ///
    /// Callers that want the site of *their* caller must themselves be
    /// annotated with `#[track_caller]`.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self { Self(Location::caller()) }

    /// Source file of the registration call.
    #[must_use]
    pub fn file(&self) -> &'static str { self.0.file() }

    /// One-based line of the registration call.
    #[must_use]
    pub fn line(&self) -> u32 { self.0.line() }

    /// Render the site in backtrace style, naming the registration kind.
    ///
    /// ```
    /// use lucid::RegistrationSite;
    ///
    /// let site = RegistrationSite::caller();
    /// assert!(site.backtrace_line("World").ends_with(":in `World'"));
    /// ```
    #[must_use]
    pub fn backtrace_line(&self, kind: &str) -> String { format!("{self}:in `{kind}'") }
}

impl fmt::Display for RegistrationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.0.file(), self.0.line(), self.0.column())
    }
}

impl From<&'static Location<'static>> for RegistrationSite {
    fn from(location: &'static Location<'static>) -> Self { Self(location) }
}
