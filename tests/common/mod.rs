//! Plugins and state shared by the integration tests.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::{Arc, Mutex};

use lucid::{Registrar, Value, World, step::StepFailure};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Scenario state produced by [`belly_plugin`]'s world factory.
#[derive(Debug, Default)]
pub struct Belly {
    pub cukes: i64,
    pub eaten: Vec<i64>,
}

fn count(args: &[Value], position: usize) -> Result<i64, StepFailure> {
    args.get(position)
        .and_then(Value::as_i64)
        .ok_or_else(|| StepFailure::Failed(format!("argument {position} is not an integer")))
}

/// A world factory, an integer transform, cuke steps, and a sequence.
pub fn belly_plugin(registrar: &mut Registrar<'_>) -> lucid::Result<()> {
    registrar.world(|| Some(Belly::default()))?;
    registrar.transform(r"\d+", |groups| Ok(Value::Integer(groups[0].parse()?)))?;
    registrar.step(r"^I have (\d+) cukes$", |world, args| {
        world.state_mut::<Belly>()?.cukes = count(args, 0)?;
        Ok(())
    })?;
    registrar.step(r"^I eat (\d+) cukes$", |world, args| {
        let eaten = count(args, 0)?;
        let belly = world.state_mut::<Belly>()?;
        belly.cukes -= eaten;
        belly.eaten.push(eaten);
        Ok(())
    })?;
    registrar.step(r"^I should have (\d+) cukes$", |world, args| {
        let expected = count(args, 0)?;
        let actual = world.state::<Belly>()?.cukes;
        world.assert_eq(&actual, &expected)
    })?;
    registrar.step(r"^the cukes are not ripe$", |world, _| {
        world.pending(Some("waiting for ripeness"))
    })?;
    registrar.sequence(
        "I snack on <count> of <total> cukes",
        "Given I have <total> cukes\nWhen I eat <count> cukes",
    )?;
    Ok(())
}

/// Records the order in which hooks and steps ran.
#[derive(Clone, Debug, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        if let Ok(mut entries) = self.0.lock() {
            entries.push(entry.into());
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().map(|entries| entries.clone()).unwrap_or_default()
    }
}

/// A plugin registering one journaling hook per phase plus a tagged one.
pub fn journal_plugin(journal: &Journal) -> impl Fn(&mut Registrar<'_>) -> lucid::Result<()> {
    let journal = journal.clone();
    move |registrar: &mut Registrar<'_>| {
        let j = journal.clone();
        registrar.before(&[], move |_, scenario| {
            j.record(format!("before {}", scenario.name()));
            Ok(())
        })?;
        let j = journal.clone();
        registrar.before(&["@slow"], move |_, _| {
            j.record("before @slow");
            Ok(())
        })?;
        let j = journal.clone();
        registrar.before_step(&[], move |_, _| {
            j.record("before step");
            Ok(())
        })?;
        let j = journal.clone();
        registrar.after_step(&[], move |_, _| {
            j.record("after step");
            Ok(())
        })?;
        let j = journal.clone();
        registrar.after(&[], move |_, scenario| {
            j.record(format!("after {}", scenario.name()));
            Ok(())
        })?;
        let j = journal.clone();
        registrar.step(r"^a journaled step$", move |_, _| {
            j.record("step");
            Ok(())
        })?;
        Ok(())
    }
}

/// Read the belly state or fail the test.
pub fn belly(world: &World) -> &Belly { world.state::<Belly>().expect("belly state") }
