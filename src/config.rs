//! Engine configuration.
//!
//! [`EngineConfig`] selects the policies the engine applies at run time. It
//! deserializes from any serde format; unset fields take their defaults.
//! Reading configuration files is the host's job.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{snippet::SnippetType, step::MatchPolicy, world::AssertionStyle};

/// Run-time policies of a [`StepLanguage`](crate::language::StepLanguage).
///
/// ```
/// use lucid::{config::EngineConfig, step::MatchPolicy, world::AssertionStyle};
///
/// let config: EngineConfig =
///     serde_json::from_str(r#"{"match_policy": "guess"}"#).expect("valid config");
/// assert_eq!(config.match_policy, MatchPolicy::Guess);
/// assert_eq!(config.assertion_style, AssertionStyle::Strict);
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// How failed assertions are reported.
    pub assertion_style: AssertionStyle,
    /// How several matches for one step are treated.
    pub match_policy: MatchPolicy,
    /// Shape of suggested snippets.
    pub snippet_type: SnippetType,
    /// Paths searched for feature files.
    pub specs_paths: Vec<PathBuf>,
}

impl EngineConfig {
    /// Set the assertion style.
    #[must_use]
    pub fn with_assertion_style(mut self, style: AssertionStyle) -> Self {
        self.assertion_style = style;
        self
    }

    /// Set the match policy.
    #[must_use]
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    /// Set the snippet type.
    #[must_use]
    pub fn with_snippet_type(mut self, snippet_type: SnippetType) -> Self {
        self.snippet_type = snippet_type;
        self
    }

    /// Set the feature search paths.
    #[must_use]
    pub fn with_specs_paths<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.specs_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}
