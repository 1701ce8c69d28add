//! Cucumber world wrapping a step language under test.

use std::sync::Arc;

use cucumber::World;
use lucid::{
    EngineConfig,
    Hook,
    HookPhase,
    LoadReport,
    LucidError,
    Registrar,
    ScenarioInfo,
    SequenceError,
    StepLanguage,
    WorldError,
    step::{MatchError, StepMatch},
};
use lucid_testing::Harness;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Marker stored by one scenario and looked for by the next.
#[derive(Debug)]
struct Marker(i64);

fn marker_plugin(registrar: &mut Registrar<'_>) -> lucid::Result<()> {
    registrar.step(r"^I store marker (\d+)$", |world, args| {
        world.insert(Marker(args[0].parse()?));
        Ok(())
    })?;
    Ok(())
}

fn register_unit_world(language: &mut StepLanguage) -> lucid::Result<()> {
    let plugin = |registrar: &mut Registrar<'_>| registrar.world(|| Some(()));
    language.load(&plugin).map(|_| ())
}

#[derive(Debug, Default, World)]
pub struct LanguageWorld {
    language: StepLanguage,
    load_error: Option<LucidError>,
    matches: Vec<StepMatch>,
    resolution: Option<Result<StepMatch, MatchError>>,
    expansion: Option<Result<String, SequenceError>>,
    hooks: Vec<(String, Arc<Hook>)>,
    selected: Vec<String>,
    harness: Option<Harness>,
}

impl LanguageWorld {
    fn load<F>(&mut self, plugin: F) -> Option<LoadReport>
    where
        F: Fn(&mut Registrar<'_>) -> lucid::Result<()>,
    {
        match self.language.load(&plugin) {
            Ok(report) => Some(report),
            Err(error) => {
                self.load_error = Some(error);
                None
            }
        }
    }

    /// Register a sequence, remembering any registration error.
    pub fn register_sequence(&mut self, phrase: &str, template: &str) {
        self.load(|registrar| registrar.sequence(phrase, template).map(|_| ()));
    }

    /// Register a pattern step whose body does nothing.
    pub fn register_pattern(&mut self, pattern: &str) -> TestResult {
        self.load(|registrar| registrar.step(pattern, |_, _| Ok(())).map(|_| ()));
        self.load_error.take().map_or(Ok(()), |error| Err(error.into()))
    }

    /// Register a before-scenario hook under `name`.
    pub fn register_hook(&mut self, name: &str, tags: &[&str]) -> TestResult {
        let report = self.load(|registrar| registrar.before(tags, |_, _| Ok(())).map(|_| ()));
        let hook = report
            .and_then(|report| report.hooks.into_iter().next())
            .ok_or("hook was not registered")?;
        self.hooks.push((name.to_owned(), hook));
        Ok(())
    }

    /// Register a world factory from a fixed call site.
    pub fn register_world_factory(&mut self) -> TestResult {
        register_unit_world(&mut self.language)?;
        Ok(())
    }

    /// Register a second world factory from a different call site.
    pub fn register_another_world_factory(&mut self) {
        let plugin = |registrar: &mut Registrar<'_>| registrar.world(|| Some(0_u8));
        if let Err(error) = self.language.load(&plugin) {
            self.load_error = Some(error);
        }
    }

    pub fn match_step(&mut self, text: &str) { self.matches = self.language.step_matches(text, None); }

    pub fn resolve_step(&mut self, text: &str) {
        self.resolution = Some(self.language.find_match(text, None));
    }

    pub fn expand(&mut self, text: &str) {
        self.expansion = Some(self.language.sequences().expand(text));
    }

    pub fn select_hooks(&mut self, tags: &str) {
        let tags: Vec<&str> = tags.split_whitespace().collect();
        self.selected = self
            .language
            .hooks()
            .applicable(HookPhase::BeforeScenario, &tags)
            .iter()
            .filter_map(|hook| {
                self.hooks
                    .iter()
                    .find(|(_, registered)| Arc::ptr_eq(registered, hook))
                    .map(|(name, _)| name.clone())
            })
            .collect();
    }

    pub fn matches(&self) -> &[StepMatch] { &self.matches }

    pub fn selected(&self) -> &[String] { &self.selected }

    pub fn load_error(&self) -> Option<&LucidError> { self.load_error.as_ref() }

    pub fn resolution(&self) -> TestResult<&Result<StepMatch, MatchError>> {
        Ok(self.resolution.as_ref().ok_or("no step was resolved")?)
    }

    pub fn expansion(&self) -> TestResult<&Result<String, SequenceError>> {
        Ok(self.expansion.as_ref().ok_or("no text was expanded")?)
    }

    /// Factory site recorded by the language.
    pub fn factory_site(&self) -> Option<lucid::RegistrationSite> { self.language.worlds().factory_site() }

    /// The registered template of `phrase`.
    pub fn template_of(&self, phrase: &str) -> TestResult<String> {
        Ok(self.language.sequences().lookup(phrase)?.template().to_owned())
    }

    pub fn load_marker_language(&mut self) -> TestResult {
        self.harness = Some(Harness::load(EngineConfig::default(), &[&marker_plugin])?);
        Ok(())
    }

    fn harness(&self) -> TestResult<&Harness> { Ok(self.harness.as_ref().ok_or("no harness loaded")?) }

    pub fn store_marker(&mut self, marker: i64) -> TestResult {
        let harness = self.harness()?;
        let mut stored = None;
        let run = harness.run_scenario_inspect(
            &ScenarioInfo::new("writer"),
            [format!("Given I store marker {marker}").as_str()],
            |world| stored = world.get::<Marker>().map(|m| m.0),
        );
        if !run.passed() {
            return Err(format!("writer scenario failed: {run:?}").into());
        }
        if stored != Some(marker) {
            return Err(format!("marker not stored: {stored:?}").into());
        }
        Ok(())
    }

    pub fn next_scenario_has_marker(&self) -> TestResult<bool> {
        let harness = self.harness()?;
        let mut seen = false;
        let run = harness.run_scenario_inspect(&ScenarioInfo::new("reader"), Vec::<&str>::new(), |world| {
            seen = world.get::<Marker>().is_some();
        });
        if let Some(error) = run.world_error {
            return Err(error.into());
        }
        Ok(seen)
    }

    /// Both sites carried by a rejected second factory.
    pub fn conflicting_sites(&self) -> TestResult<(lucid::RegistrationSite, lucid::RegistrationSite)> {
        match self.load_error() {
            Some(LucidError::World(WorldError::MultipleFactories { first, second })) => {
                Ok((*first, *second))
            }
            other => Err(format!("expected a factory conflict, got {other:?}").into()),
        }
    }
}
