//! Caller-side selection of a single match.
//!
//! [`StepRegistry::match_all`](super::StepRegistry::match_all) deliberately
//! returns every match. Callers that need exactly one definition run the
//! result through [`resolve`] with the [`MatchPolicy`] they want; callers that
//! can use several (snippet suggestions, listings) simply skip it.

use serde::Deserialize;
use tracing::warn;

use super::{MatchError, StepMatch};
use crate::metrics::{self, MatchOutcome};

/// How to treat several matches for one step.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MatchPolicy {
    /// More than one match is an ambiguity error.
    #[default]
    Strict,
    /// Narrow several matches to the closest one before giving up.
    Guess,
}

impl MatchPolicy {
    /// The library default (currently [`MatchPolicy::Strict`]).
    pub const DEFAULT: MatchPolicy = MatchPolicy::Strict;
}

/// Select exactly one match for `name`.
///
/// # Errors
///
/// Returns [`MatchError::Undefined`] when `matches` is empty and
/// [`MatchError::Ambiguous`] listing every candidate when more than one
/// remains after applying `policy`.
pub fn resolve(
    name: &str,
    matches: Vec<StepMatch>,
    policy: MatchPolicy,
) -> Result<StepMatch, MatchError> {
    let mut candidates = match policy {
        MatchPolicy::Guess if matches.len() > 1 => best_matches(matches),
        _ => matches,
    };
    match candidates.len() {
        0 => {
            metrics::inc_step_matches(MatchOutcome::Undefined);
            warn!(step = name, "undefined step");
            Err(MatchError::Undefined {
                name: name.to_owned(),
            })
        }
        1 => {
            metrics::inc_step_matches(MatchOutcome::Matched);
            Ok(candidates.remove(0))
        }
        count => {
            metrics::inc_step_matches(MatchOutcome::Ambiguous);
            warn!(step = name, count, "ambiguous step");
            Err(MatchError::Ambiguous {
                name: name.to_owned(),
                candidates: candidates
                    .iter()
                    .map(|m| m.definition().to_string())
                    .collect(),
            })
        }
    }
}

/// Prefer argument-less matches with the longest pattern; otherwise the
/// matches with the most arguments and the least captured text.
fn best_matches(matches: Vec<StepMatch>) -> Vec<StepMatch> {
    let captured = |m: &StepMatch| m.arguments().iter().map(|a| a.len()).sum::<usize>();

    let (no_args, with_args): (Vec<_>, Vec<_>) =
        matches.into_iter().partition(|m| m.arguments().is_empty());
    if !no_args.is_empty() {
        let longest = no_args.iter().map(StepMatch::text_length).max().unwrap_or(0);
        return no_args
            .into_iter()
            .filter(|m| m.text_length() == longest)
            .collect();
    }

    let most = with_args.iter().map(|m| m.arguments().len()).max().unwrap_or(0);
    let top: Vec<_> = with_args
        .into_iter()
        .filter(|m| m.arguments().len() == most)
        .collect();
    let shortest = top.iter().map(captured).min().unwrap_or(0);
    top.into_iter().filter(|m| captured(m) == shortest).collect()
}
