//! Step definitions for the behavioural suite.

use cucumber::{given, then, when};
use lucid::{LucidError, SequenceError, step::MatchError};

use crate::world::{LanguageWorld, TestResult};

#[given(expr = "a sequence {string} running {string}")]
fn given_sequence(world: &mut LanguageWorld, phrase: String, template: String) -> TestResult {
    world.register_sequence(&phrase, &template);
    match world.load_error() {
        Some(error) => Err(format!("sequence rejected: {error}").into()),
        None => Ok(()),
    }
}

#[when(expr = "a sequence {string} running {string} is registered")]
fn when_sequence(world: &mut LanguageWorld, phrase: String, template: String) {
    world.register_sequence(&phrase, &template);
}

#[then("registration fails because the phrase is taken")]
fn then_phrase_taken(world: &mut LanguageWorld) {
    assert!(matches!(
        world.load_error(),
        Some(LucidError::Sequence(SequenceError::DuplicateSequence { .. }))
    ));
}

#[then(expr = "the sequence {string} still runs {string}")]
fn then_sequence_kept(world: &mut LanguageWorld, phrase: String, template: String) -> TestResult {
    assert_eq!(world.template_of(&phrase)?, template);
    Ok(())
}

#[when(expr = "the text {string} is expanded")]
fn when_expanded(world: &mut LanguageWorld, text: String) { world.expand(&text); }

#[then(expr = "the expansion is {string}")]
fn then_expansion(world: &mut LanguageWorld, expected: String) -> TestResult {
    assert_eq!(world.expansion()?.as_deref(), Ok(expected.as_str()));
    Ok(())
}

#[then("expansion fails because a value is blank")]
fn then_blank_value(world: &mut LanguageWorld) -> TestResult {
    assert!(matches!(
        world.expansion()?,
        Err(SequenceError::EmptyParameter(_))
    ));
    Ok(())
}

#[given(expr = "a step pattern {string}")]
fn given_pattern(world: &mut LanguageWorld, pattern: String) -> TestResult {
    world.register_pattern(&pattern)
}

#[when(expr = "I match the step {string}")]
fn when_matched(world: &mut LanguageWorld, text: String) { world.match_step(&text); }

#[when(expr = "I resolve the step {string}")]
fn when_resolved(world: &mut LanguageWorld, text: String) { world.resolve_step(&text); }

#[then(expr = "there is/are {int} match(es)")]
fn then_match_count(world: &mut LanguageWorld, count: usize) {
    assert_eq!(world.matches().len(), count);
}

#[then(expr = "match argument {int} is {string}")]
fn then_match_argument(world: &mut LanguageWorld, position: usize, expected: String) -> TestResult {
    let step_match = world.matches().first().ok_or("no match")?;
    let args = step_match.args();
    let actual = position
        .checked_sub(1)
        .and_then(|index| args.get(index).copied().flatten())
        .ok_or("no such argument")?;
    assert_eq!(actual, expected);
    Ok(())
}

#[then(expr = "resolution is ambiguous between {int} definitions")]
fn then_ambiguous(world: &mut LanguageWorld, count: usize) -> TestResult {
    let Err(MatchError::Ambiguous { candidates, .. }) = world.resolution()? else {
        return Err("resolution was not ambiguous".into());
    };
    assert_eq!(candidates.len(), count);
    Ok(())
}

#[given(expr = "a before hook {string} with no tags")]
fn given_untagged_hook(world: &mut LanguageWorld, name: String) -> TestResult {
    world.register_hook(&name, &[])
}

#[given(expr = "a before hook {string} requiring {string}")]
fn given_tagged_hook(world: &mut LanguageWorld, name: String, tag: String) -> TestResult {
    world.register_hook(&name, &[tag.as_str()])
}

#[when(expr = "before hooks are selected for tags {string}")]
fn when_hooks_selected(world: &mut LanguageWorld, tags: String) { world.select_hooks(&tags); }

#[then(expr = "the selected hooks are {string}")]
fn then_selected_hooks(world: &mut LanguageWorld, expected: String) {
    let expected: Vec<&str> = expected.split(',').map(str::trim).collect();
    assert_eq!(world.selected(), expected);
}

#[given("a world factory is registered")]
fn given_world_factory(world: &mut LanguageWorld) -> TestResult { world.register_world_factory() }

#[when("another world factory is registered")]
fn when_another_world_factory(world: &mut LanguageWorld) { world.register_another_world_factory(); }

#[then("registration fails naming both factory sites")]
fn then_both_sites(world: &mut LanguageWorld) -> TestResult {
    let (first, second) = world.conflicting_sites()?;
    assert_ne!(first, second);
    assert_eq!(world.factory_site(), Some(first));
    let message = world.load_error().map(ToString::to_string).unwrap_or_default();
    assert!(message.contains(&first.to_string()));
    assert!(message.contains(&second.to_string()));
    Ok(())
}

#[given("a language that stores markers in the world")]
fn given_marker_language(world: &mut LanguageWorld) -> TestResult { world.load_marker_language() }

#[when(expr = "a scenario stores marker {int}")]
fn when_marker_stored(world: &mut LanguageWorld, marker: i64) -> TestResult {
    world.store_marker(marker)
}

#[then("the next scenario starts without a marker")]
fn then_no_marker(world: &mut LanguageWorld) -> TestResult {
    assert!(!world.next_scenario_has_marker()?);
    Ok(())
}
