//! Extension modules composed into every world.

use std::sync::Arc;

use super::{World, WorldMethod};
use crate::{step::StepResult, value::Value};

/// A capability added to every world when a scenario begins.
///
/// Modules are installed in registration order. Installation is additive: a
/// module cannot replace state or methods that the factory or an earlier
/// module already provided.
///
/// ```
/// use lucid::{
///     value::Value,
///     world::{World, WorldExtender, WorldModule},
/// };
///
/// struct Cukes;
///
/// impl WorldModule for Cukes {
///     fn name(&self) -> &str { "cukes" }
///
///     fn install(&self, world: &mut WorldExtender<'_>) {
///         world.provide(0u32);
///         world.define_method("eat", |world: &mut World, _args: &[Value]| {
///             *world.state_mut::<u32>()? += 1;
///             Ok(())
///         });
///     }
/// }
/// ```
pub trait WorldModule: Send + Sync {
    /// Name recorded in the world's capability list.
    fn name(&self) -> &str;

    /// Add this module's state and methods to `world`.
    fn install(&self, world: &mut WorldExtender<'_>);
}

/// Additive view of a world handed to [`WorldModule::install`].
pub struct WorldExtender<'a> {
    world: &'a mut World,
}

impl<'a> WorldExtender<'a> {
    pub(super) fn new(world: &'a mut World) -> Self { Self { world } }

    /// Store `value` unless the world already holds a value of type `T`.
    ///
    /// Returns `true` if the value was stored.
    pub fn provide<T: Send + 'static>(&mut self, value: T) -> bool {
        self.world.capabilities.insert_if_absent(value)
    }

    /// Add a named method unless one with that name exists.
    ///
    /// Returns `true` if the method was added.
    pub fn define_method<F>(&mut self, name: &str, method: F) -> bool
    where
        F: Fn(&mut World, &[Value]) -> StepResult + Send + Sync + 'static,
    {
        if self.world.methods.contains_key(name) {
            return false;
        }
        let method: Arc<WorldMethod> = Arc::new(method);
        self.world.methods.insert(name.to_owned(), method);
        true
    }

    /// Read-only access to the world being extended.
    #[must_use]
    pub fn world(&self) -> &World { self.world }
}
