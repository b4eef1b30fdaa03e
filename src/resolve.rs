//! Resolution of parameter types against a registry.
//!
//! A parameter requiring the type `T` is declared as `Option<Arc<T>>`, where `T` is either a concrete type or a
//! trait object. Each parameter is resolved in the following order:
//!
//! 1. If a value was registered exactly as `T`, that value is used.
//! 2. Otherwise every entry is scanned for values declared to provide `T`.
//!    - No match resolves to `None`. This is not an error, so abstract dependencies can be optional.
//!    - Exactly one match resolves to that value.
//!    - More than one match fails the whole resolution with [`InjectError::Ambiguous`].

use std::{
    any::{self, TypeId},
    sync::Arc,
};

use itertools::Itertools;
use tracing::trace;

use crate::{error::InjectError, registry::Registry};

/// A single parameter which can be supplied by a [`Registry`].
pub trait Dependency: Sized + 'static {
    /// Resolves the parameter from a consistent snapshot of the registry, noting how it was resolved in `trail`.
    fn resolve(registry: &Registry, trail: &mut Trail) -> Result<Self, InjectError>;
}

impl<T> Dependency for Option<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn resolve(registry: &Registry, trail: &mut Trail) -> Result<Self, InjectError> {
        let (value, outcome) = registry.lookup::<T>()?;
        trail.record(any::type_name::<T>(), outcome);
        Ok(value)
    }
}

/// An ordered list of parameters, resolved together under one lock.
///
/// Implemented for tuples of up to 12 [`Dependency`] values.
pub trait Dependencies: Sized + 'static {
    /// Resolves every parameter in order, failing on the first ambiguity.
    fn resolve_all(registry: &Registry, trail: &mut Trail) -> Result<Self, InjectError>;
}

macro_rules! impl_dependencies {
    ($($ty:ident),*) => {
        impl<$($ty),*> Dependencies for ($($ty,)*)
        where
            $($ty: Dependency,)*
        {
            #[allow(unused_variables)]
            fn resolve_all(registry: &Registry, trail: &mut Trail) -> Result<Self, InjectError> {
                Ok(($($ty::resolve(registry, trail)?,)*))
            }
        }
    };
}

impl_dependencies!();
impl_dependencies!(D1);
impl_dependencies!(D1, D2);
impl_dependencies!(D1, D2, D3);
impl_dependencies!(D1, D2, D3, D4);
impl_dependencies!(D1, D2, D3, D4, D5);
impl_dependencies!(D1, D2, D3, D4, D5, D6);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8, D9);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11);
impl_dependencies!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12);

/// How a single parameter was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A value was registered exactly as the required type.
    Exact,
    /// The only value providing the required type, named by its registered type.
    Provided(&'static str),
    /// Nothing provides the required type, so the parameter is `None`.
    Missing,
}

/// The outcomes of a resolution, kept until the registry lock is released.
///
/// Logging is deferred so that no subscriber runs while the lock is held.
#[derive(Debug, Default)]
pub struct Trail {
    resolved: Vec<(&'static str, Outcome)>,
}

impl Trail {
    /// The resolved parameters in order, each with the name of its required type.
    pub fn resolved(&self) -> &[(&'static str, Outcome)] {
        &self.resolved
    }

    pub(crate) fn record(&mut self, required: &'static str, outcome: Outcome) {
        self.resolved.push((required, outcome));
    }

    pub(crate) fn emit(&self) {
        for (required, outcome) in &self.resolved {
            match outcome {
                Outcome::Exact => trace!(required, "resolved exact match"),
                Outcome::Provided(provider) => {
                    trace!(required, provider, "resolved capability match")
                }
                Outcome::Missing => trace!(required, "no match, using none"),
            }
        }
    }
}

impl Registry {
    /// Resolves a single required type.
    ///
    /// Returns `Ok(None)` when nothing provides `T`, and an [`InjectError::Ambiguous`] error when more than one
    /// registered value provides it without any value registered exactly as `T`.
    pub fn resolve<T>(&self) -> Result<Option<Arc<T>>, InjectError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.lookup::<T>().map(|(value, _)| value)
    }

    pub(crate) fn lookup<T>(&self) -> Result<(Option<Arc<T>>, Outcome), InjectError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let required = TypeId::of::<T>();
        if let Some(entry) = self.entries.get(&required) {
            return Ok((entry.value.get::<T>(), Outcome::Exact));
        }

        // All entries are visited so that ambiguity is always detected.
        let mut candidates = self
            .entries
            .values()
            .filter_map(|entry| {
                entry
                    .capabilities
                    .get(&required)
                    .and_then(|capability| capability.get::<T>())
                    .map(|value| (entry.value.type_name(), value))
            })
            .collect_vec();

        match candidates.len() {
            0 => Ok((None, Outcome::Missing)),
            1 => {
                let (provider, value) = candidates.remove(0);
                Ok((Some(value), Outcome::Provided(provider)))
            }
            _ => Err(InjectError::Ambiguous {
                required: any::type_name::<T>(),
                candidates: candidates
                    .into_iter()
                    .map(|(type_name, _)| type_name)
                    .sorted_unstable()
                    .collect_vec(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{provide, provide::IntoRegistrations, registry::Batch, Provide};

    use super::*;

    trait Reader: Send + Sync {
        fn read(&self) -> &'static str;
    }

    #[derive(Debug)]
    struct FileHandle;

    impl Reader for FileHandle {
        fn read(&self) -> &'static str {
            "file"
        }
    }

    struct Socket;

    impl Reader for Socket {
        fn read(&self) -> &'static str {
            "socket"
        }
    }

    fn build(registrations: impl IntoRegistrations) -> Registry {
        let mut batch = Batch::default();
        registrations.into_registrations(&mut batch);
        let mut registry = Registry::default();
        registry.apply(batch);
        registry
    }

    #[test]
    fn exact_match() {
        let registry = build(Provide::new(FileHandle));
        assert!(registry.resolve::<FileHandle>().unwrap().is_some());
    }

    #[test]
    fn unique_capability_match() {
        let registry = build(provide!(FileHandle => dyn Reader));
        let reader = registry.resolve::<dyn Reader>().unwrap().unwrap();
        assert_eq!(reader.read(), "file");

        let (_, outcome) = registry.lookup::<dyn Reader>().unwrap();
        assert_eq!(outcome, Outcome::Provided(any::type_name::<FileHandle>()));
    }

    #[test]
    fn no_match_is_none() {
        let registry = build(Provide::new(FileHandle));
        assert!(registry.resolve::<dyn Reader>().unwrap().is_none());
        assert!(registry.resolve::<Socket>().unwrap().is_none());
    }

    #[test]
    fn ambiguous_match_names_sorted_candidates() {
        let registry = build((
            provide!(Socket => dyn Reader),
            provide!(FileHandle => dyn Reader),
        ));
        let Err(err) = registry.resolve::<dyn Reader>() else {
            panic!("expected an ambiguity");
        };
        assert_eq!(
            err,
            InjectError::Ambiguous {
                required: any::type_name::<dyn Reader>(),
                candidates: vec![
                    any::type_name::<FileHandle>(),
                    any::type_name::<Socket>()
                ],
            }
        );
    }

    #[test]
    fn exact_registration_of_trait_object_wins_over_providers() {
        let direct: Arc<dyn Reader> = Arc::new(Socket);
        let registry = build((
            direct,
            provide!(FileHandle => dyn Reader),
            provide!(Socket => dyn Reader),
        ));
        let reader = registry.resolve::<dyn Reader>().unwrap().unwrap();
        assert_eq!(reader.read(), "socket");
    }

    #[test]
    fn tuples_resolve_in_order_and_abort_on_ambiguity() {
        let registry = build((Provide::new(1u32), Provide::new("two")));
        let mut trail = Trail::default();
        let (one, two, three) =
            <(Option<Arc<u32>>, Option<Arc<&'static str>>, Option<Arc<u64>>)>::resolve_all(
                &registry, &mut trail,
            )
            .unwrap();
        assert_eq!(one.as_deref(), Some(&1));
        assert_eq!(two.as_deref(), Some(&"two"));
        assert!(three.is_none());
        assert_eq!(
            trail.resolved(),
            &[
                (any::type_name::<u32>(), Outcome::Exact),
                (any::type_name::<&'static str>(), Outcome::Exact),
                (any::type_name::<u64>(), Outcome::Missing),
            ]
        );

        let registry = build((
            Provide::new(1u32),
            provide!(Socket => dyn Reader),
            provide!(FileHandle => dyn Reader),
        ));
        let mut trail = Trail::default();
        let result =
            <(Option<Arc<u32>>, Option<Arc<dyn Reader>>)>::resolve_all(&registry, &mut trail);
        assert!(matches!(result, Err(err) if err.is_ambiguous()));
        assert_eq!(trail.resolved(), &[(any::type_name::<u32>(), Outcome::Exact)]);
    }
}
