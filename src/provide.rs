//! Registration descriptors.
//!
//! Rust cannot ask at runtime whether a type implements a trait, so every registration declares up front which
//! abstract types its value provides. A [`Provide`] wraps the value in an [`Arc`] and eagerly converts it into
//! each declared capability, so resolution only has to look capabilities up.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use wireup::{provide, Context, Provide};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let ctx = Context::new();
//! ctx.add(Provide::new(English).implements::<dyn Greeter>(|english| english as Arc<dyn Greeter>));
//!
//! // Equivalent, using the macro.
//! ctx.add(provide!(English => dyn Greeter));
//! ```

use std::{
    any::{self, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use tracing::trace;

use crate::registry::{Batch, Entry, Shared};

/// A value to be registered, along with the abstract types it provides.
pub struct Provide<V: ?Sized> {
    value: Arc<V>,
    capabilities: HashMap<TypeId, Shared>,
}

impl<V> Provide<V>
where
    V: Send + Sync + 'static,
{
    /// Wraps a value to be registered under its own type.
    pub fn new(value: V) -> Self {
        Provide::shared(Arc::new(value))
    }
}

impl<V> Provide<V>
where
    V: ?Sized + Send + Sync + 'static,
{
    /// Registers an already shared value under the type `V`.
    ///
    /// `V` may be unsized, which allows a `dyn Trait` value to be registered directly.
    /// It will then exactly match parameters requiring that trait object.
    pub fn shared(value: Arc<V>) -> Self {
        Provide {
            value,
            capabilities: HashMap::new(),
        }
    }

    /// Declares that the value provides the abstract type `C`.
    ///
    /// The `cast` is usually an unsizing coercion such as `|value| value as Arc<dyn Trait>`.
    /// Declaring the same capability twice keeps the latest cast.
    pub fn implements<C>(mut self, cast: fn(Arc<V>) -> Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let capability = Shared::new(cast(Arc::clone(&self.value)));
        self.capabilities.insert(TypeId::of::<C>(), capability);
        self
    }

    /// Returns `true` if this value was declared to provide `C`.
    pub fn provides<C>(&self) -> bool
    where
        C: ?Sized + 'static,
    {
        self.capabilities.contains_key(&TypeId::of::<C>())
    }

    fn into_entry(self) -> (TypeId, Entry) {
        (
            TypeId::of::<V>(),
            Entry {
                value: Shared::new(self.value),
                capabilities: self.capabilities,
            },
        )
    }
}

impl<V: ?Sized> fmt::Debug for Provide<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provide")
            .field("type", &any::type_name::<V>())
            .field(
                "capabilities",
                &self
                    .capabilities
                    .values()
                    .map(Shared::type_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builds a [`Provide`] for a value, optionally declaring the trait objects it implements.
///
/// ```
/// # use wireup::provide;
/// # trait Reader: Send + Sync {}
/// # trait Writer: Send + Sync {}
/// # struct File;
/// # impl Reader for File {}
/// # impl Writer for File {}
/// let file = provide!(File => dyn Reader, dyn Writer);
/// assert!(file.provides::<dyn Reader>());
/// assert!(file.provides::<dyn Writer>());
/// ```
#[macro_export]
macro_rules! provide {
    ($value:expr $(=> $($capability:ty),+ $(,)?)?) => {
        $crate::Provide::new($value)
            $($(.implements::<$capability>(|value| value as ::std::sync::Arc<$capability>))+)?
    };
}

/// Values that can be passed to [`Context::add`](crate::Context::add).
///
/// Implemented for [`Provide`], [`Arc`], and for [`Option`], [`Vec`], arrays and tuples of registrations.
/// A `None` anywhere in a batch is skipped without affecting the rest.
pub trait IntoRegistrations {
    /// Appends the registrations to a batch.
    fn into_registrations(self, batch: &mut Batch);
}

impl<V> IntoRegistrations for Provide<V>
where
    V: ?Sized + Send + Sync + 'static,
{
    fn into_registrations(self, batch: &mut Batch) {
        let (type_id, entry) = self.into_entry();
        batch.push(type_id, entry);
    }
}

impl<T> IntoRegistrations for Arc<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn into_registrations(self, batch: &mut Batch) {
        Provide::shared(self).into_registrations(batch)
    }
}

impl<R> IntoRegistrations for Option<R>
where
    R: IntoRegistrations,
{
    fn into_registrations(self, batch: &mut Batch) {
        match self {
            Some(registrations) => registrations.into_registrations(batch),
            None => trace!("skipping absent registration"),
        }
    }
}

impl<R> IntoRegistrations for Vec<R>
where
    R: IntoRegistrations,
{
    fn into_registrations(self, batch: &mut Batch) {
        for registrations in self {
            registrations.into_registrations(batch);
        }
    }
}

impl<R, const N: usize> IntoRegistrations for [R; N]
where
    R: IntoRegistrations,
{
    fn into_registrations(self, batch: &mut Batch) {
        for registrations in self {
            registrations.into_registrations(batch);
        }
    }
}

macro_rules! impl_into_registrations {
    ($($ty:ident),*) => {
        impl<$($ty),*> IntoRegistrations for ($($ty,)*)
        where
            $($ty: IntoRegistrations,)*
        {
            #[allow(non_snake_case, unused_variables)]
            fn into_registrations(self, batch: &mut Batch) {
                let ($($ty,)*) = self;
                $($ty.into_registrations(batch);)*
            }
        }
    };
}

impl_into_registrations!();
impl_into_registrations!(R1);
impl_into_registrations!(R1, R2);
impl_into_registrations!(R1, R2, R3);
impl_into_registrations!(R1, R2, R3, R4);
impl_into_registrations!(R1, R2, R3, R4, R5);
impl_into_registrations!(R1, R2, R3, R4, R5, R6);
impl_into_registrations!(R1, R2, R3, R4, R5, R6, R7);
impl_into_registrations!(R1, R2, R3, R4, R5, R6, R7, R8);
impl_into_registrations!(R1, R2, R3, R4, R5, R6, R7, R8, R9);
impl_into_registrations!(R1, R2, R3, R4, R5, R6, R7, R8, R9, R10);
impl_into_registrations!(R1, R2, R3, R4, R5, R6, R7, R8, R9, R10, R11);
impl_into_registrations!(R1, R2, R3, R4, R5, R6, R7, R8, R9, R10, R11, R12);
