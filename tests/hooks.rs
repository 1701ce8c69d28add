//! Hook selection and the order hooks run in around steps.

mod common;

use std::sync::Arc;

use common::{Journal, journal_plugin};
use lucid::{
    EngineConfig,
    HookPhase,
    HookScheduler,
    LucidError,
    Registrar,
    ScenarioInfo,
    StepLanguage,
    TagExpressionError,
    step::StepFailure,
};
use lucid_testing::{Harness, StepStatus};
use rstest::rstest;

#[rstest]
#[case(&["@slow"], &["H1", "H2"])]
#[case(&[], &["H1"])]
#[case(&["@fast"], &["H1"])]
fn untagged_hooks_always_apply(#[case] tags: &[&str], #[case] expected: &[&str]) {
    let mut scheduler = HookScheduler::default();
    let h1 = scheduler
        .register(HookPhase::BeforeScenario, &[] as &[&str], |_, _| Ok(()))
        .expect("no tags");
    scheduler
        .register(HookPhase::BeforeScenario, &["@slow"], |_, _| Ok(()))
        .expect("valid tags");

    let selected: Vec<_> = scheduler
        .applicable(HookPhase::BeforeScenario, tags)
        .iter()
        .map(|hook| if Arc::ptr_eq(hook, &h1) { "H1" } else { "H2" })
        .collect();
    assert_eq!(selected, expected);
    assert!(scheduler.applicable(HookPhase::AfterScenario, tags).is_empty());
}

#[test]
fn hooks_wrap_scenarios_and_steps() {
    let journal = Journal::default();
    let plugin = journal_plugin(&journal);
    let harness = Harness::load(EngineConfig::default(), &[&plugin]).expect("plugin loads");

    let scenario = ScenarioInfo::new("wrapped").with_tags(["@slow"]);
    let run = harness.run_scenario(&scenario, ["Given a journaled step", "And a journaled step"]);
    assert!(run.passed(), "{run:?}");
    assert_eq!(
        journal.entries(),
        [
            "before wrapped",
            "before @slow",
            "before step",
            "step",
            "after step",
            "before step",
            "step",
            "after step",
            "after wrapped",
        ]
    );
}

#[test]
fn failing_before_hook_skips_steps_but_after_hooks_run() {
    let journal = Journal::default();
    let recording = journal_plugin(&journal);
    let failing = |registrar: &mut Registrar<'_>| -> lucid::Result<()> {
        registrar.before(&["@broken"], |_, _| Err(StepFailure::Failed("no database".to_owned())))?;
        Ok(())
    };
    let harness =
        Harness::load(EngineConfig::default(), &[&recording, &failing]).expect("plugins load");

    let scenario = ScenarioInfo::new("broken").with_tags(["@broken"]);
    let run = harness.run_scenario(&scenario, ["Given a journaled step"]);
    assert_eq!(run.statuses(), [&StepStatus::Skipped]);
    assert_eq!(
        run.hook_failures,
        [(HookPhase::BeforeScenario, "no database".to_owned())]
    );
    assert_eq!(journal.entries(), ["before broken", "after broken"]);
}

#[test]
fn panicking_hook_is_reported_as_a_failure() {
    let plugin = |registrar: &mut Registrar<'_>| -> lucid::Result<()> {
        registrar.after(&[], |_, _| panic!("teardown exploded"))?;
        Ok(())
    };
    let harness = Harness::load(EngineConfig::default(), &[&plugin]).expect("plugin loads");
    let run = harness.run_scenario(&ScenarioInfo::new("explosive"), Vec::<&str>::new());
    assert_eq!(run.hook_failures.len(), 1);
    assert_eq!(run.hook_failures[0].0, HookPhase::AfterScenario);
    assert!(run.hook_failures[0].1.contains("teardown exploded"));
    assert!(!harness.language().worlds().is_active());
}

#[rstest]
#[case(&["@a", "@b,~@c"], &["@a", "@b"], true)]
#[case(&["@a", "@b,~@c"], &["@a", "@c"], false)]
#[case(&["@a", "@b,~@c"], &["@a"], true)]
#[case(&["~@wip"], &["@wip"], false)]
fn tag_lists_are_conjunctions_of_disjunctions(
    #[case] expression: &[&str],
    #[case] scenario_tags: &[&str],
    #[case] applies: bool,
) {
    let mut scheduler = HookScheduler::default();
    scheduler
        .register(HookPhase::BeforeStep, expression, |_, _| Ok(()))
        .expect("valid expression");
    assert_eq!(
        scheduler
            .applicable(HookPhase::BeforeStep, scenario_tags)
            .len(),
        usize::from(applies)
    );
}

#[test]
fn malformed_tags_stop_the_load() {
    let plugin = |registrar: &mut Registrar<'_>| -> lucid::Result<()> {
        registrar.before(&["slow"], |_, _| Ok(()))?;
        Ok(())
    };
    let mut language = StepLanguage::default();
    let err = language.load(&plugin).expect_err("tag without @");
    assert!(matches!(
        err,
        LucidError::Tags(TagExpressionError::InvalidTag { ref term, .. }) if term == "slow"
    ));
    assert_eq!(language.hooks().count(HookPhase::BeforeScenario), 0);
}

#[test]
fn clearing_hooks_leaves_steps_in_place() {
    let journal = Journal::default();
    let plugin = journal_plugin(&journal);
    let mut language = StepLanguage::default();
    language.load(&plugin).expect("plugin loads");
    language.clear_hooks();
    for phase in [
        HookPhase::BeforeScenario,
        HookPhase::AfterScenario,
        HookPhase::BeforeStep,
        HookPhase::AfterStep,
    ] {
        assert_eq!(language.hooks().count(phase), 0);
    }
    assert_eq!(language.steps().len(), 1);
}
