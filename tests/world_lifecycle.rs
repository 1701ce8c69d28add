//! World creation, extension, binding, and isolation across scenarios.

mod common;

use std::path::PathBuf;

use common::{Belly, TestResult, belly_plugin};
use lucid::{
    Attachment,
    EngineConfig,
    LucidError,
    Registrar,
    ScenarioInfo,
    StepLanguage,
    Value,
    World,
    WorldError,
    WorldModule,
    step::{StepBody, StepOptions},
    world::{ASSERTIONS_CAPABILITY, AssertionStyle, WorldExtender, WorldPhase},
};
use lucid_testing::{Embedded, Harness, StepStatus};
use proptest::prelude::*;

/// Marker written into a world by one scenario and looked for by the next.
#[derive(Debug, PartialEq)]
struct Marker(u64);

struct Greeter;

impl WorldModule for Greeter {
    fn name(&self) -> &str { "greeter" }

    fn install(&self, world: &mut WorldExtender<'_>) {
        world.provide(Belly {
            cukes: 100,
            eaten: Vec::new(),
        });
        world.define_method("greet", |world: &mut World, args: &[Value]| {
            let name = args.first().and_then(Value::as_str).unwrap_or("nobody");
            world.puts(&format!("hello {name}"))?;
            Ok(())
        });
    }
}

fn greeter_plugin(registrar: &mut Registrar<'_>) -> lucid::Result<()> {
    registrar.world_module(Greeter);
    registrar.step_with(
        r"^I greet (\w+)$",
        StepBody::named("greet"),
        StepOptions::default().display("I greet <name>"),
    )?;
    registrar.step(r"^I write (\d+) markers?$", |world, args| {
        let value = args[0].parse()?;
        world.insert(Marker(value));
        Ok(())
    })?;
    registrar.step(r"^I talk to the user$", |world, _| {
        let answer = world.ask("favourite vegetable?")?;
        world.puts(&format!("you said {answer}"))?;
        world.embed(
            &Attachment::Data(answer.into_bytes()),
            "text/plain",
            Some("answer"),
        )?;
        Ok(())
    })?;
    Ok(())
}

fn first_factory(registrar: &mut Registrar<'_>) -> lucid::Result<()> {
    registrar.world(|| Some(Belly::default()))
}

fn second_factory(registrar: &mut Registrar<'_>) -> lucid::Result<()> {
    registrar.world(|| Some(0_u8))
}

#[test]
fn second_factory_names_both_sites() {
    let mut language = StepLanguage::default();
    language.load(&first_factory).expect("first factory registers");
    let err = language
        .load(&second_factory)
        .expect_err("only one factory allowed");

    let LucidError::World(WorldError::MultipleFactories { first, second }) = &err else {
        panic!("expected a factory conflict, got {err:?}");
    };
    assert_eq!(language.worlds().factory_site(), Some(*first));
    assert!(first.file().ends_with("world_lifecycle.rs"));
    assert!(second.line() > first.line());
    let message = err.to_string();
    assert!(message.contains(&first.to_string()));
    assert!(message.contains(&second.to_string()));
}

#[test]
fn absent_world_points_at_the_factory() {
    let plugin = |registrar: &mut Registrar<'_>| -> lucid::Result<()> {
        registrar.world(|| None::<Belly>)?;
        registrar.step("^anything$", |_, _| Ok(()))?;
        Ok(())
    };
    let harness = Harness::load(EngineConfig::default(), &[&plugin]).expect("plugin loads");
    let site = harness
        .language()
        .worlds()
        .factory_site()
        .expect("factory registered");

    let run = harness.run_scenario(&ScenarioInfo::new("void"), ["Given anything"]);
    assert!(run.steps.is_empty());
    assert_eq!(run.world_error, Some(WorldError::Absent { site }));
    assert!(
        run.world_error
            .map(|error| error.to_string())
            .is_some_and(|message| message.contains(&site.backtrace_line("World")))
    );
    assert!(!harness.language().worlds().is_active());
}

#[test]
fn abandoned_world_does_not_block_the_next_scenario() {
    let harness = Harness::load(EngineConfig::default(), &[&belly_plugin]).expect("plugin loads");
    let language = harness.language();
    let scenario = ScenarioInfo::new("abandoned");

    let world = language
        .begin_scenario(&scenario, harness.facade())
        .expect("first world");
    drop(world);

    let run = harness.run_scenario(&scenario, ["Given I have 2 cukes", "Then I should have 2 cukes"]);
    assert!(run.passed(), "{run:?}");
}

#[test]
fn modules_extend_without_replacing_factory_state() {
    let harness = Harness::load(EngineConfig::default(), &[&belly_plugin, &greeter_plugin])
        .expect("plugins load");
    let scenario = ScenarioInfo::new("greeting").with_language("fr");
    let run = harness.run_scenario_inspect(&scenario, ["When I greet Ana"], |world| {
        assert_eq!(world.phase(), WorldPhase::Bound);
        assert_eq!(world.natural_language(), Some("fr"));
        assert_eq!(world.capabilities(), [ASSERTIONS_CAPABILITY, "greeter"]);
        assert_eq!(world.get::<Belly>().map(|belly| belly.cukes), Some(0));
        assert!(world.responds_to("greet"));
    });
    assert!(run.passed(), "{run:?}");
    assert_eq!(harness.interface().output(), ["hello Ana"]);
}

#[test]
fn named_step_without_method_fails() {
    let plugin = |registrar: &mut Registrar<'_>| -> lucid::Result<()> {
        registrar.named_step(r"^I dance$", "dance")?;
        Ok(())
    };
    let harness = Harness::load(EngineConfig::default(), &[&plugin]).expect("plugin loads");
    let run = harness.run_scenario(&ScenarioInfo::new("clumsy"), ["When I dance"]);
    assert_eq!(
        run.statuses(),
        [&StepStatus::Failed("world has no method named \"dance\"".to_owned())]
    );
}

#[test]
fn soft_assertions_are_reported_when_the_scenario_ends() {
    let config = EngineConfig::default().with_assertion_style(AssertionStyle::Soft);
    let harness = Harness::load(config, &[&belly_plugin]).expect("plugin loads");
    let run = harness.run_scenario(
        &ScenarioInfo::new("lenient"),
        [
            "Given I have 5 cukes",
            "Then I should have 4 cukes",
            "Then I should have 3 cukes",
            "When I eat 1 cukes",
        ],
    );
    assert!(
        run.steps
            .iter()
            .all(|step| step.status == StepStatus::Passed)
    );
    assert_eq!(
        run.end_error,
        Some(WorldError::SoftAssertions(vec![
            "expected 4, got 5".to_owned(),
            "expected 3, got 5".to_owned(),
        ]))
    );
    assert!(!run.passed());
}

#[test]
fn step_code_reaches_the_interface() -> TestResult {
    let harness = Harness::load(EngineConfig::default().with_specs_paths(["features"]), &[
        &greeter_plugin,
    ])?;
    harness.interface().answer("leek");
    let run = harness.run_scenario(&ScenarioInfo::new("chatty"), ["When I talk to the user"]);
    assert!(run.passed(), "{run:?}");
    assert_eq!(
        harness.interface().output(),
        ["favourite vegetable?", "you said leek"]
    );
    assert_eq!(
        harness.interface().embedded(),
        [Embedded {
            attachment: Attachment::Data(b"leek".to_vec()),
            mime_type: "text/plain".to_owned(),
            label: Some("answer".to_owned()),
        }]
    );
    assert_eq!(harness.facade().specs_paths(), [PathBuf::from("features")]);
    assert_eq!(harness.facade().step_match("I greet Bo", None).len(), 1);
    Ok(())
}

#[test]
fn unbound_world_cannot_reach_collaborators() {
    let mut world = World::from_state(Belly::default());
    assert_eq!(world.puts("hello"), Err(WorldError::NotBound));
    let failure = world.step("I have 3 cukes").expect_err("no orchestrator");
    assert_eq!(failure.to_string(), WorldError::NotBound.to_string());
}

proptest! {
    #[test]
    fn markers_never_leak_between_scenarios(markers in prop::collection::vec(0_u64..1_000, 1..8)) {
        let harness = Harness::load(EngineConfig::default(), &[&greeter_plugin])
            .expect("plugin loads");
        for (index, marker) in markers.iter().enumerate() {
            let scenario = ScenarioInfo::new(format!("scenario {index}"));
            let step = format!("Given I write {marker} markers");
            let mut seen_before = None;
            let run = harness.run_scenario_inspect(&scenario, [step.as_str()], |world| {
                seen_before = Some(world.get::<Marker>().map(|m| m.0));
            });
            prop_assert!(run.passed());
            prop_assert_eq!(seen_before, Some(Some(*marker)));

            let fresh = ScenarioInfo::new(format!("observer {index}"));
            let mut leaked = None;
            harness.run_scenario_inspect(&fresh, Vec::<&str>::new(), |world| {
                leaked = Some(world.get::<Marker>().is_some());
            });
            prop_assert_eq!(leaked, Some(false));
        }
    }
}
