use quote::{format_ident, quote, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    parse_quote,
    spanned::Spanned,
    Data, DeriveInput, Fields, Generics, Ident, Type,
};

/// The largest tuple implementing `Dependencies`.
const MAX_DEPENDENCIES: usize = 12;

pub struct DeriveBind {
    ident: Ident,
    generics: Generics,
    fields: Vec<(Ident, Type)>,
}

impl ToTokens for DeriveBind {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let Self {
            ident,
            generics,
            fields,
        } = self;

        let mut generics = generics.clone();
        {
            let where_clause = generics.make_where_clause();
            for (_, ty) in fields {
                where_clause
                    .predicates
                    .push(parse_quote!(#ty: ::wireup::Dependency));
            }
        }
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        let names = fields.iter().map(|(name, _)| name);
        let types = fields.iter().map(|(_, ty)| ty);
        let vars: Vec<_> = fields
            .iter()
            .map(|(name, _)| format_ident!("__wireup_{}", name))
            .collect();

        tokens.extend(quote! {
            #[automatically_derived]
            impl #impl_generics ::wireup::Bind for #ident #ty_generics #where_clause {
                type Deps = ( #( #types, )* );

                #[inline]
                fn bind(&mut self, ( #( #vars, )* ): Self::Deps) {
                    #( self.#names = #vars; )*
                }
            }
        });
    }
}

impl Parse for DeriveBind {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let input: DeriveInput = input.parse()?;
        let span = input.span();
        let named = match input.data {
            Data::Struct(data) => match data.fields {
                Fields::Named(named) => named.named,
                Fields::Unit => Default::default(),
                Fields::Unnamed(_) => {
                    return Err(syn::Error::new(
                        span,
                        "Bind can only be derived for structs with named fields",
                    ))
                }
            },
            Data::Enum(_) | Data::Union(_) => {
                return Err(syn::Error::new(
                    span,
                    "Bind can only be derived for structs",
                ))
            }
        };

        let mut fields = Vec::with_capacity(named.len());
        for field in named {
            let mut skip = false;
            for attr in &field.attrs {
                if attr.path().is_ident("bind") {
                    if skip {
                        return Err(syn::Error::new(
                            attr.span(),
                            "bind attribute already specified",
                        ));
                    }
                    attr.parse_args_with(|input: ParseStream<'_>| {
                        input.parse::<kw::skip>()?;
                        Ok(())
                    })?;
                    skip = true;
                }
            }
            if !skip {
                // Named fields always carry an ident.
                if let Some(ident) = field.ident {
                    fields.push((ident, field.ty));
                }
            }
        }

        if fields.len() > MAX_DEPENDENCIES {
            return Err(syn::Error::new(
                span,
                format!("Bind supports at most {MAX_DEPENDENCIES} dependencies, found {}", fields.len()),
            ));
        }

        Ok(DeriveBind {
            ident: input.ident,
            generics: input.generics,
            fields,
        })
    }
}

mod kw {
    syn::custom_keyword!(skip);
}
