//! Dispatching injections to targets.
//!
//! A target is anything implementing [`Injectable`]:
//!
//! - Functions and closures whose parameters are all [`Dependency`] values, up to 12 parameters.
//!   The return value, if any, is discarded.
//! - A `&mut` reference to a value implementing [`Bind`], whose [`Bind::bind`] operation receives the dependencies.
//! - An `Option` of either, where `None` is rejected with [`InjectError::NilTarget`].
//!
//! Targets whose type is only known at runtime go through [`Context::inject_dyn`] instead.

use std::{any::Any, fmt};

use crate::{
    error::InjectError,
    resolve::{Dependencies, Dependency},
    Context,
};

/// A value exposing a bind operation to receive its dependencies.
///
/// This trait can be derived for structs whose fields are all dependencies, with fields marked `#[bind(skip)]`
/// left out.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use wireup::{Bind, Context};
///
/// struct Config {
///     port: u16,
/// }
///
/// #[derive(Default)]
/// struct Server {
///     config: Option<Arc<Config>>,
/// }
///
/// impl Bind for Server {
///     type Deps = (Option<Arc<Config>>,);
///
///     fn bind(&mut self, (config,): Self::Deps) {
///         self.config = config;
///     }
/// }
///
/// let ctx = Context::new();
/// ctx.add(Arc::new(Config { port: 8080 }));
///
/// let mut server = Server::default();
/// ctx.inject(&mut server)?;
/// assert_eq!(server.config.map(|config| config.port), Some(8080));
/// # Ok::<(), wireup::error::InjectError>(())
/// ```
///
/// # Deriving
///
/// The derive accepts structs with named fields and unit structs, with at most 12 bound fields.
/// Anything else is a compile error:
///
/// ```compile_fail
/// #[derive(wireup::Bind)]
/// enum Transport {
///     Tcp,
///     Udp,
/// }
/// ```
///
/// ```compile_fail
/// use std::sync::Arc;
///
/// #[derive(wireup::Bind)]
/// struct Pair(Option<Arc<u32>>, Option<Arc<u64>>);
/// ```
///
/// ```compile_fail
/// #[derive(wireup::Bind)]
/// struct Server {
///     #[bind(skip)]
///     #[bind(skip)]
///     port: u16,
/// }
/// ```
///
/// ```compile_fail
/// #[derive(wireup::Bind)]
/// struct Server {
///     #[bind(foo)]
///     port: u16,
/// }
/// ```
///
/// ```compile_fail
/// use std::sync::Arc;
///
/// #[derive(wireup::Bind)]
/// struct Wide {
///     a: Option<Arc<u8>>,
///     b: Option<Arc<u16>>,
///     c: Option<Arc<u32>>,
///     d: Option<Arc<u64>>,
///     e: Option<Arc<i8>>,
///     f: Option<Arc<i16>>,
///     g: Option<Arc<i32>>,
///     h: Option<Arc<i64>>,
///     i: Option<Arc<f32>>,
///     j: Option<Arc<f64>>,
///     k: Option<Arc<bool>>,
///     l: Option<Arc<char>>,
///     m: Option<Arc<String>>,
/// }
/// ```
///
/// Skipped fields don't count towards the limit:
///
/// ```
/// use std::sync::Arc;
///
/// #[derive(wireup::Bind)]
/// struct Wide {
///     a: Option<Arc<u8>>,
///     b: Option<Arc<u16>>,
///     c: Option<Arc<u32>>,
///     d: Option<Arc<u64>>,
///     e: Option<Arc<i8>>,
///     f: Option<Arc<i16>>,
///     g: Option<Arc<i32>>,
///     h: Option<Arc<i64>>,
///     i: Option<Arc<f32>>,
///     j: Option<Arc<f64>>,
///     k: Option<Arc<bool>>,
///     l: Option<Arc<char>>,
///     #[bind(skip)]
///     m: Option<Arc<String>>,
/// }
///
/// let mut wide = Wide { a: None, b: None, c: None, d: None, e: None, f: None, g: None, h: None, i: None, j: None, k: None, l: None, m: None };
/// wireup::Context::new().inject(&mut wide)?;
/// # Ok::<(), wireup::error::InjectError>(())
/// ```
pub trait Bind {
    /// The dependencies resolved for [`Bind::bind`].
    type Deps: Dependencies;

    /// Receives the resolved dependencies.
    fn bind(&mut self, deps: Self::Deps);
}

/// A target dependencies can be injected into.
///
/// The `Marker` parameter distinguishes the shapes of target and is inferred.
pub trait Injectable<Marker> {
    /// Resolves the target's parameters from the context and invokes it.
    ///
    /// Nothing is invoked if an error is returned.
    fn inject_into(self, ctx: &Context) -> Result<(), InjectError>;
}

/// Markers used to tell apart the [`Injectable`] implementations.
pub mod marker {
    use std::marker::PhantomData;

    /// Marks a `&mut` target implementing [`Bind`](crate::Bind).
    #[derive(Debug)]
    pub struct BindOperation;

    /// Marks an optional target.
    #[derive(Debug)]
    pub struct Nullable<M>(PhantomData<M>);
}

impl<B> Injectable<marker::BindOperation> for &mut B
where
    B: Bind + ?Sized,
{
    fn inject_into(self, ctx: &Context) -> Result<(), InjectError> {
        let deps = ctx.resolve::<B::Deps>()?;
        self.bind(deps);
        Ok(())
    }
}

impl<T, M> Injectable<marker::Nullable<M>> for Option<T>
where
    T: Injectable<M>,
{
    fn inject_into(self, ctx: &Context) -> Result<(), InjectError> {
        match self {
            Some(target) => target.inject_into(ctx),
            None => Err(InjectError::NilTarget),
        }
    }
}

macro_rules! impl_injectable_fn {
    ($($ty:ident),*) => {
        impl<Func, Ret, $($ty),*> Injectable<fn($($ty),*) -> Ret> for Func
        where
            Func: FnOnce($($ty),*) -> Ret,
            $($ty: Dependency,)*
        {
            #[allow(non_snake_case)]
            fn inject_into(self, ctx: &Context) -> Result<(), InjectError> {
                let ($($ty,)*) = ctx.resolve::<($($ty,)*)>()?;
                let _ = self($($ty),*);
                Ok(())
            }
        }
    };
}

impl_injectable_fn!();
impl_injectable_fn!(D1);
impl_injectable_fn!(D1, D2);
impl_injectable_fn!(D1, D2, D3);
impl_injectable_fn!(D1, D2, D3, D4);
impl_injectable_fn!(D1, D2, D3, D4, D5);
impl_injectable_fn!(D1, D2, D3, D4, D5, D6);
impl_injectable_fn!(D1, D2, D3, D4, D5, D6, D7);
impl_injectable_fn!(D1, D2, D3, D4, D5, D6, D7, D8);
impl_injectable_fn!(D1, D2, D3, D4, D5, D6, D7, D8, D9);
impl_injectable_fn!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10);
impl_injectable_fn!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11);
impl_injectable_fn!(D1, D2, D3, D4, D5, D6, D7, D8, D9, D10, D11, D12);

/// A type-erased injection target, implemented for every `'static` type.
///
/// Used with [`Context::inject_dyn`] when the target's type isn't known statically.
pub trait AnyTarget: Any {
    /// The name of the target's concrete type.
    fn type_name(&self) -> &'static str;

    /// Upcasts to [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AnyTarget for T {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl fmt::Debug for dyn AnyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyTarget").field(&self.type_name()).finish()
    }
}

/// Binds an erased target known to be a `B`.
pub(crate) fn bind_erased<B>(target: &mut dyn Any, ctx: &Context) -> Result<(), InjectError>
where
    B: Bind + 'static,
{
    match target.downcast_mut::<B>() {
        Some(target) => ctx.inject(target),
        None => Err(InjectError::NotInjectable {
            type_name: std::any::type_name::<B>(),
        }),
    }
}
