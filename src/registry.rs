//! Type-indexed storage for registered dependencies.
//!
//! Each registered value lives behind an [`Arc`] and is keyed by the exact [`TypeId`] it was registered as.
//! A [`Registry`] is only ever reached through the lock owned by a [`Context`](crate::Context), so holding a
//! `&Registry` means holding a consistent snapshot of every entry.

use std::{
    any::{self, Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use tracing::trace;

use crate::{error::InjectError, Context};

/// Type-erased bind operation for a type made bindable with [`Context::bindable`](crate::Context::bindable).
pub(crate) type Binder = fn(&mut dyn Any, &Context) -> Result<(), InjectError>;

/// A type-erased `Arc<T>` remembering the name of `T`.
pub(crate) struct Shared {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl Shared {
    pub(crate) fn new<T>(value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Shared {
            type_name: any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Clones the inner `Arc<T>`, or returns `None` if it holds a different type.
    pub(crate) fn get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.type_name).finish()
    }
}

/// A registered value along with the abstract types it was declared to provide.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) value: Shared,
    pub(crate) capabilities: HashMap<TypeId, Shared>,
}

/// A registration applied to a registry, logged once the lock is released.
#[derive(Debug)]
pub(crate) struct Applied {
    type_name: &'static str,
    capabilities: usize,
    replaced: bool,
}

impl Applied {
    pub(crate) fn emit(&self) {
        trace!(
            type_name = self.type_name,
            capabilities = self.capabilities,
            replaced = self.replaced,
            "registered dependency"
        );
    }
}

/// The set of entries a context resolves from.
///
/// At most one entry exists per type. Obtained for the duration of a resolution by
/// [`Dependency::resolve`](crate::Dependency::resolve).
#[derive(Default)]
pub struct Registry {
    pub(crate) entries: HashMap<TypeId, Entry>,
    pub(crate) binders: HashMap<TypeId, Binder>,
}

impl Registry {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Registry {
            entries: HashMap::with_capacity(capacity),
            binders: HashMap::new(),
        }
    }

    /// The number of registered dependencies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a value has been registered exactly as type `T`.
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Applies a whole batch, replacing any entry of the same type.
    pub(crate) fn apply(&mut self, batch: Batch) -> Vec<Applied> {
        batch
            .entries
            .into_iter()
            .map(|(type_id, entry)| {
                let type_name = entry.value.type_name();
                let capabilities = entry.capabilities.len();
                let replaced = self.entries.insert(type_id, entry).is_some();
                Applied {
                    type_name,
                    capabilities,
                    replaced,
                }
            })
            .collect()
    }

    pub(crate) fn insert_binder(&mut self, type_id: TypeId, binder: Binder) {
        self.binders.insert(type_id, binder);
    }

    pub(crate) fn binder(&self, type_id: &TypeId) -> Option<Binder> {
        self.binders.get(type_id).copied()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "entries",
                &self
                    .entries
                    .values()
                    .map(|entry| entry.value.type_name())
                    .collect::<Vec<_>>(),
            )
            .field("binders", &self.binders.len())
            .finish()
    }
}

/// Registrations collected before being applied to a registry under a single lock.
#[derive(Debug, Default)]
pub struct Batch {
    entries: Vec<(TypeId, Entry)>,
}

impl Batch {
    pub(crate) fn push(&mut self, type_id: TypeId, entry: Entry) {
        self.entries.push((type_id, entry));
    }

    /// The number of registrations in the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the batch holds no registrations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
