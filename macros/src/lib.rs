mod derive_bind;

use derive_bind::DeriveBind;
use proc_macro::TokenStream;
use quote::ToTokens;
use syn::parse_macro_input;

/// Derive macro implementing the [Bind](https://docs.rs/wireup/latest/wireup/inject/trait.Bind.html) trait.
///
/// Every named field becomes a dependency, resolved in declaration order and assigned on bind.
/// Fields marked `#[bind(skip)]` are left untouched.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
///
/// use wireup::Bind;
///
/// #[derive(Bind)]
/// struct Server {
///     logger: Option<Arc<dyn Logger>>,
///     config: Option<Arc<Config>>,
///     #[bind(skip)]
///     requests: u64,
/// }
/// ```
///
/// <details>
/// <summary>See expanded code</summary>
///
/// ```ignore
/// impl ::wireup::Bind for Server {
///     type Deps = (Option<Arc<dyn Logger>>, Option<Arc<Config>>,);
///
///     fn bind(&mut self, (__wireup_logger, __wireup_config,): Self::Deps) {
///         self.logger = __wireup_logger;
///         self.config = __wireup_config;
///     }
/// }
/// ```
/// </details>
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let derive_bind = parse_macro_input!(input as DeriveBind);
    TokenStream::from(derive_bind.into_token_stream())
}
