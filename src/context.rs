//! The dependency container.

use std::{
    any::{self, TypeId},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, warn};

use crate::{
    error::InjectError,
    inject::{bind_erased, AnyTarget, Bind, Injectable},
    provide::IntoRegistrations,
    registry::{Batch, Registry},
    resolve::{Dependencies, Trail},
};

/// A set of dependencies which can be injected into functions and bindable values.
///
/// Dependencies are indexed by their exact type, with at most one value per type. A context is not a global: create
/// as many as needed and share them between threads, typically behind an [`Arc`](std::sync::Arc).
///
/// Registration and resolution are guarded by a single lock. A batch passed to [`Context::add`] is applied
/// atomically, and every parameter of one injection is resolved from the same snapshot. The target itself is
/// invoked after the lock is released, so it may freely add to or inject from the same context. Logging also
/// happens outside the lock.
#[derive(Debug, Default)]
pub struct Context {
    registry: Mutex<Registry>,
}

impl Context {
    /// Creates a new empty context.
    pub fn new() -> Self {
        Context::default()
    }

    /// Creates a new empty context with room for at least `capacity` dependencies.
    pub fn with_capacity(capacity: usize) -> Self {
        Context {
            registry: Mutex::new(Registry::with_capacity(capacity)),
        }
    }

    /// Registers dependencies, returning the context for chaining.
    ///
    /// Each dependency replaces any previous one of the same type. `None` values are skipped.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use wireup::{Context, Provide};
    ///
    /// let ctx = Context::new();
    /// ctx.add(Provide::new(1u32))
    ///     .add((Arc::new("name"), None::<Provide<u64>>))
    ///     .add(Provide::new(2u32));
    ///
    /// assert_eq!(ctx.len(), 2);
    /// ctx.inject(|n: Option<Arc<u32>>| assert_eq!(n.as_deref(), Some(&2)))?;
    /// # Ok::<(), wireup::error::InjectError>(())
    /// ```
    pub fn add<R>(&self, registrations: R) -> &Self
    where
        R: IntoRegistrations,
    {
        let mut batch = Batch::default();
        registrations.into_registrations(&mut batch);
        let count = batch.len();

        let applied = self.lock().apply(batch);
        for registered in &applied {
            registered.emit();
        }
        debug!(count, "added dependencies");

        self
    }

    /// Injects dependencies into a function, closure, or `&mut` bindable value.
    ///
    /// Dependencies are bound according to the following rules:
    ///
    /// - A value registered exactly as the parameter type is used.
    /// - Otherwise, if exactly one registered value provides the parameter type, that value is used.
    /// - If no registered value provides it, the parameter is `None`.
    /// - If more than one registered value provides it, [`InjectError::Ambiguous`] is returned.
    ///
    /// The target is only invoked if every parameter resolved, and its return value is discarded.
    pub fn inject<T, M>(&self, target: T) -> Result<(), InjectError>
    where
        T: Injectable<M>,
    {
        let res = target.inject_into(self);
        match &res {
            Ok(()) => debug!("injected dependencies"),
            Err(err) => debug!(%err, "failed to inject dependencies"),
        }
        res
    }

    /// Resolves a tuple of dependencies without invoking anything.
    pub fn resolve<D>(&self) -> Result<D, InjectError>
    where
        D: Dependencies,
    {
        let mut trail = Trail::default();
        let res = D::resolve_all(&self.lock(), &mut trail);
        trail.emit();
        if let Err(err) = &res {
            warn!(%err, "ambiguous dependency");
        }
        res
    }

    /// Allows values of type `B` to be injected through [`Context::inject_dyn`].
    pub fn bindable<B>(&self) -> &Self
    where
        B: Bind + 'static,
    {
        self.lock()
            .insert_binder(TypeId::of::<B>(), bind_erased::<B>);
        debug!(type_name = any::type_name::<B>(), "added bindable type");
        self
    }

    /// Injects dependencies into a target whose type is only known at runtime.
    ///
    /// The target's type must have been made bindable with [`Context::bindable`],
    /// otherwise [`InjectError::NotInjectable`] is returned.
    pub fn inject_dyn(&self, target: Option<&mut dyn AnyTarget>) -> Result<(), InjectError> {
        let Some(target) = target else {
            return Err(InjectError::NilTarget);
        };

        let type_name = (*target).type_name();
        let target = target.as_any_mut();
        let binder = self.lock().binder(&(*target).type_id());
        match binder {
            Some(binder) => binder(target, self),
            None => {
                warn!(type_name, "target is not injectable");
                Err(InjectError::NotInjectable { type_name })
            }
        }
    }

    /// The number of registered dependencies.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no dependencies are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns `true` if a dependency is registered exactly as type `T`.
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.lock().contains::<T>()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // Entries are inserted whole, so a poisoned registry is still consistent.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
