//! Assertion capability installed into every world.

use std::fmt::Debug;

use serde::Deserialize;

use crate::step::{StepFailure, StepResult};

/// How failed assertions are reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionStyle {
    /// Fail the step at the first failed assertion.
    #[default]
    Strict,
    /// Record failures and report them together when the scenario ends.
    Soft,
}

impl AssertionStyle {
    /// Default style used when none is configured.
    pub const DEFAULT: AssertionStyle = AssertionStyle::Strict;
}

/// Evaluates assertions according to an [`AssertionStyle`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assertions {
    style: AssertionStyle,
    failures: Vec<String>,
}

impl Assertions {
    /// Create an assertion capability with `style`.
    #[must_use]
    pub fn new(style: AssertionStyle) -> Self {
        Self {
            style,
            failures: Vec::new(),
        }
    }

    /// Active style.
    #[must_use]
    pub fn style(&self) -> AssertionStyle { self.style }

    /// Check `condition`.
    ///
    /// # Errors
    ///
    /// In strict style, returns [`StepFailure::Assertion`] carrying `message`
    /// when `condition` is false. Soft style records the message and
    /// succeeds.
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> StepResult {
        if condition {
            return Ok(());
        }
        let message = message.into();
        match self.style {
            AssertionStyle::Strict => Err(StepFailure::Assertion(message)),
            AssertionStyle::Soft => {
                self.failures.push(message);
                Ok(())
            }
        }
    }

    /// Check that `left == right`.
    ///
    /// # Errors
    ///
    /// See [`Assertions::check`].
    pub fn check_eq<T: PartialEq + Debug + ?Sized>(&mut self, left: &T, right: &T) -> StepResult {
        self.check(
            left == right,
            format!("expected {right:?}, got {left:?}"),
        )
    }

    /// Failures recorded in soft style.
    #[must_use]
    pub fn failures(&self) -> &[String] { &self.failures }

    /// Remove and return the recorded failures.
    pub fn take_failures(&mut self) -> Vec<String> { std::mem::take(&mut self.failures) }
}
