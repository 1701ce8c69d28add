//! World lifecycle: creation, extension, binding, and release.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::{debug, warn};

use super::{Assertions, AssertionStyle, World, WorldError, WorldModule, WorldPhase};
use crate::{
    collaborators::ScenarioNode,
    facade::Facade,
    location::RegistrationSite,
    metrics::{self, RegistrationKind},
    panic::catch_body_panic,
};

/// Produces the world for a scenario. `None` is an error.
pub type WorldFactoryFn = dyn Fn() -> Option<World> + Send + Sync;

struct RegisteredFactory {
    body: Arc<WorldFactoryFn>,
    site: RegistrationSite,
}

/// Marks a manager's scenario as running for as long as its world lives.
///
/// Dropping the world, whether through [`WorldManager::end_scenario`] or not,
/// frees the manager for the next scenario.
pub(crate) struct ScenarioLease {
    active: Arc<AtomicBool>,
}

impl ScenarioLease {
    fn acquire(active: &Arc<AtomicBool>) -> Option<Self> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                active: Arc::clone(active),
            })
    }

    fn held_by(&self, active: &Arc<AtomicBool>) -> bool { Arc::ptr_eq(&self.active, active) }
}

impl Drop for ScenarioLease {
    fn drop(&mut self) { self.active.store(false, Ordering::Release); }
}

/// Creates one world per scenario and releases it afterwards.
///
/// At most one factory may be registered. Without one, every scenario starts
/// from an empty [`World`]. Modules are installed into each new world in
/// registration order.
pub struct WorldManager {
    factory: Option<RegisteredFactory>,
    modules: Vec<Arc<dyn WorldModule>>,
    assertion_style: AssertionStyle,
    active: Arc<AtomicBool>,
}

impl Default for WorldManager {
    fn default() -> Self { Self::new(AssertionStyle::DEFAULT) }
}

impl WorldManager {
    /// Create a manager whose worlds use `assertion_style`.
    #[must_use]
    pub fn new(assertion_style: AssertionStyle) -> Self {
        Self {
            factory: None,
            modules: Vec::new(),
            assertion_style,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a factory producing the scenario's state, attributing it to
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MultipleFactories`] if a factory is already
    /// registered.
    #[track_caller]
    pub fn register_factory<T, F>(&mut self, factory: F) -> Result<(), WorldError>
    where
        T: Send + 'static,
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        self.register_factory_at(
            Arc::new(move || factory().map(World::from_state)),
            RegistrationSite::caller(),
        )
    }

    /// Register a world factory attributed to `site`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MultipleFactories`] naming both sites if a
    /// factory is already registered; the first stays in place.
    pub fn register_factory_at(
        &mut self,
        body: Arc<WorldFactoryFn>,
        site: RegistrationSite,
    ) -> Result<(), WorldError> {
        if let Some(existing) = &self.factory {
            warn!(first = %existing.site, second = %site, "second world factory rejected");
            return Err(WorldError::MultipleFactories {
                first: existing.site,
                second: site,
            });
        }
        self.factory = Some(RegisteredFactory { body, site });
        metrics::inc_registrations(RegistrationKind::WorldFactory);
        debug!(%site, "registered world factory");
        Ok(())
    }

    /// Register a module installed into every world.
    pub fn register_module(&mut self, module: Arc<dyn WorldModule>) {
        debug!(module = module.name(), "registered world module");
        self.modules.push(module);
        metrics::inc_registrations(RegistrationKind::WorldModule);
    }

    /// Site of the registered factory, if any.
    #[must_use]
    pub fn factory_site(&self) -> Option<RegistrationSite> {
        self.factory.as_ref().map(|factory| factory.site)
    }

    /// Names of registered modules in installation order.
    #[must_use]
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    /// Assertion style installed into new worlds.
    #[must_use]
    pub fn assertion_style(&self) -> AssertionStyle { self.assertion_style }

    /// Whether a scenario is running.
    #[must_use]
    pub fn is_active(&self) -> bool { self.active.load(Ordering::Acquire) }

    /// Create, extend, and bind the world for `scenario`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ScenarioActive`] while the previous scenario's
    /// world is still alive, or [`WorldError::Absent`] /
    /// [`WorldError::FactoryPanicked`], naming the factory's registration
    /// site, if the factory fails.
    pub fn begin_scenario(
        &self,
        scenario: &dyn ScenarioNode,
        facade: Facade,
    ) -> Result<World, WorldError> {
        let Some(lease) = ScenarioLease::acquire(&self.active) else {
            return Err(WorldError::ScenarioActive);
        };
        let mut world = match self.create() {
            Ok(world) => world,
            Err(error) => {
                drop(lease);
                metrics::inc_world_failures();
                warn!(scenario = scenario.name(), %error, "world creation failed");
                return Err(error);
            }
        };
        world.lease = Some(lease);
        transition(scenario.name(), WorldPhase::Created);

        world.extend_with(Assertions::new(self.assertion_style), &self.modules);
        transition(scenario.name(), WorldPhase::Extended);

        world.bind(facade, scenario.language());
        transition(scenario.name(), WorldPhase::Bound);

        metrics::inc_scenarios();
        Ok(world)
    }

    /// Release the scenario's world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ForeignWorld`] if `world` was not begun by this
    /// manager, or [`WorldError::SoftAssertions`] if soft assertions failed
    /// during the scenario. The world is released either way.
    pub fn end_scenario(&self, mut world: World) -> Result<(), WorldError> {
        if !world.lease.as_ref().is_some_and(|lease| lease.held_by(&self.active)) {
            return Err(WorldError::ForeignWorld);
        }
        let failures = world.take_assertion_failures();
        drop(world);
        debug!(phase = %WorldPhase::Idle, "world transition");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(WorldError::SoftAssertions(failures))
        }
    }

    fn create(&self) -> Result<World, WorldError> {
        let Some(factory) = &self.factory else {
            return Ok(World::default());
        };
        match catch_body_panic(|| (factory.body)()) {
            Ok(Some(world)) => Ok(world),
            Ok(None) => Err(WorldError::Absent { site: factory.site }),
            Err(message) => Err(WorldError::FactoryPanicked {
                site: factory.site,
                message,
            }),
        }
    }
}

fn transition(scenario: &str, phase: WorldPhase) {
    debug!(scenario, %phase, "world transition");
}

impl fmt::Debug for WorldManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldManager")
            .field("factory", &self.factory_site())
            .field("modules", &self.module_names())
            .field("assertion_style", &self.assertion_style)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};
    use tracing_test::traced_test;

    use super::WorldManager;
    use crate::{
        collaborators::ScenarioInfo,
        test_helpers,
        world::{
            ASSERTIONS_CAPABILITY,
            AssertionStyle,
            World,
            WorldError,
            WorldExtender,
            WorldModule,
            WorldPhase,
        },
    };

    #[derive(Debug, PartialEq)]
    struct Basket(u32);

    struct Belly;

    impl WorldModule for Belly {
        fn name(&self) -> &str { "belly" }

        fn install(&self, world: &mut WorldExtender<'_>) {
            world.provide(Basket(99));
            world.provide(String::from("empty"));
            world.define_method("eat", |world: &mut World, _: &[_]| {
                world.state_mut::<Basket>()?.0 -= 1;
                Ok(())
            });
        }
    }

    #[fixture]
    fn scenario() -> ScenarioInfo { ScenarioInfo::new("eating").with_language("fr") }

    #[rstest]
    fn default_world_is_extended_and_bound(scenario: ScenarioInfo) {
        let manager = WorldManager::default();
        let (facade, _) = test_helpers::facade();
        let world = manager.begin_scenario(&scenario, facade).expect("default world");
        assert_eq!(world.phase(), WorldPhase::Bound);
        assert_eq!(world.natural_language(), Some("fr"));
        assert_eq!(world.capabilities(), [ASSERTIONS_CAPABILITY]);
        assert!(manager.is_active());
        manager.end_scenario(world).expect("no soft failures");
        assert!(!manager.is_active());
    }

    #[rstest]
    fn modules_do_not_overwrite_factory_state(scenario: ScenarioInfo) {
        let mut manager = WorldManager::default();
        manager
            .register_factory(|| Some(Basket(3)))
            .expect("first factory");
        manager.register_module(Arc::new(Belly));
        let (facade, _) = test_helpers::facade();
        let mut world = manager.begin_scenario(&scenario, facade).expect("world");

        assert_eq!(world.capabilities(), [ASSERTIONS_CAPABILITY, "belly"]);
        assert_eq!(world.get::<String>().map(String::as_str), Some("empty"));
        world.call_method("eat", &[]).expect("method installed");
        assert_eq!(world.get::<Basket>(), Some(&Basket(2)));
        manager.end_scenario(world).expect("no soft failures");
    }

    #[test]
    fn second_factory_names_both_sites() {
        let mut manager = WorldManager::default();
        manager.register_factory(|| Some(1u8)).expect("first factory");
        let first = manager.factory_site().expect("factory registered");
        let err = manager.register_factory(|| Some(2u8)).unwrap_err();

        let WorldError::MultipleFactories { first: reported, second } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(*reported, first);
        assert_ne!(*second, first);
        let message = err.to_string();
        assert!(message.contains(&first.to_string()));
        assert!(message.contains(&second.to_string()));
        assert_eq!(manager.factory_site(), Some(first));
    }

    #[rstest]
    fn absent_world_points_at_factory(scenario: ScenarioInfo) {
        let mut manager = WorldManager::default();
        manager
            .register_factory(|| None::<Basket>)
            .expect("first factory");
        let site = manager.factory_site().expect("factory registered");
        let (facade, _) = test_helpers::facade();

        let err = manager.begin_scenario(&scenario, facade).unwrap_err();
        assert_eq!(err, WorldError::Absent { site });
        assert!(err.to_string().contains(&site.to_string()));
        assert!(!manager.is_active());
    }

    #[rstest]
    fn panicking_factory_fails_the_scenario(scenario: ScenarioInfo) {
        let mut manager = WorldManager::default();
        manager
            .register_factory(|| -> Option<Basket> { panic!("no baskets left") })
            .expect("first factory");
        let (facade, _) = test_helpers::facade();

        let err = manager.begin_scenario(&scenario, facade).unwrap_err();
        assert!(matches!(
            err,
            WorldError::FactoryPanicked { ref message, .. } if message == "no baskets left"
        ));
    }

    #[rstest]
    fn overlapping_scenarios_are_rejected(scenario: ScenarioInfo) {
        let manager = WorldManager::default();
        let (facade, _) = test_helpers::facade();
        let world = manager
            .begin_scenario(&scenario, facade.clone())
            .expect("first scenario");
        assert_eq!(
            manager.begin_scenario(&scenario, facade).unwrap_err(),
            WorldError::ScenarioActive
        );
        manager.end_scenario(world).expect("no soft failures");
    }

    #[rstest]
    fn dropping_a_world_frees_the_manager(scenario: ScenarioInfo) {
        let manager = WorldManager::default();
        let (facade, _) = test_helpers::facade();
        let world = manager
            .begin_scenario(&scenario, facade.clone())
            .expect("first scenario");
        drop(world);
        assert!(!manager.is_active());

        let world = manager
            .begin_scenario(&scenario, facade)
            .expect("second scenario after an abandoned world");
        manager.end_scenario(world).expect("no soft failures");
    }

    #[rstest]
    fn worlds_from_another_manager_are_refused(scenario: ScenarioInfo) {
        let ours = WorldManager::default();
        let theirs = WorldManager::default();
        let (facade, _) = test_helpers::facade();
        let own_world = ours
            .begin_scenario(&scenario, facade.clone())
            .expect("our scenario");
        let their_world = theirs.begin_scenario(&scenario, facade).expect("their scenario");

        assert_eq!(ours.end_scenario(their_world), Err(WorldError::ForeignWorld));
        assert!(ours.is_active());
        assert!(!theirs.is_active());
        assert_eq!(
            ours.end_scenario(World::default()),
            Err(WorldError::ForeignWorld)
        );
        ours.end_scenario(own_world).expect("no soft failures");
        assert!(!ours.is_active());
    }

    #[rstest]
    fn soft_failures_are_reported_at_scenario_end(scenario: ScenarioInfo) {
        let manager = WorldManager::new(AssertionStyle::Soft);
        let (facade, _) = test_helpers::facade();
        let mut world = manager.begin_scenario(&scenario, facade).expect("world");
        world.assert(false, "first").expect("soft");
        world.assert_eq(&1, &2).expect("soft");

        let err = manager.end_scenario(world).unwrap_err();
        assert_eq!(
            err,
            WorldError::SoftAssertions(vec!["first".into(), "expected 2, got 1".into()])
        );
    }

    #[rstest]
    #[traced_test]
    fn lifecycle_visits_every_phase_in_order(scenario: ScenarioInfo) {
        let manager = WorldManager::default();
        let (facade, _) = test_helpers::facade();
        let world = manager.begin_scenario(&scenario, facade).expect("world");
        manager.end_scenario(world).expect("no soft failures");

        logs_assert(|lines: &[&str]| {
            let phases: Vec<&str> = lines
                .iter()
                .filter(|line| line.contains("world transition"))
                .filter_map(|line| {
                    ["created", "extended", "bound", "idle"]
                        .into_iter()
                        .find(|phase| line.contains(&format!("phase={phase}")))
                })
                .collect();
            if phases == ["created", "extended", "bound", "idle"] {
                Ok(())
            } else {
                Err(format!("unexpected transitions: {phases:?}"))
            }
        });
    }

    #[rstest]
    fn worlds_bind_the_facade(scenario: ScenarioInfo) {
        let manager = WorldManager::default();
        let (facade, orchestrator) = test_helpers::facade();
        let mut world = manager.begin_scenario(&scenario, facade).expect("world");
        world.steps("Given I eat\n\nThen I am full").expect("recorded");
        assert_eq!(world.ask("hungry?"), Ok("yes".to_owned()));
        assert_eq!(
            *orchestrator.invoked.lock().expect("lock"),
            vec!["Given I eat", "Then I am full"]
        );
        manager.end_scenario(world).expect("no soft failures");
    }
}
