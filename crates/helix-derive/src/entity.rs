use crate::model::{Cardinality, StructModel, parse_struct, value_expr};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Error};

// derive_entity
pub(crate) fn derive_entity(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let model = match parse_struct(&input) {
        Ok(model) => model,
        Err(err) => return err.to_compile_error(),
    };

    let field_values = match field_values_impl(&input, &model) {
        Ok(tokens) => tokens,
        Err(err) => return err.to_compile_error(),
    };
    let entity = match entity_impl(&input, &model) {
        Ok(tokens) => tokens,
        Err(err) => return err.to_compile_error(),
    };
    let lifecycle = lifecycle_impl(&input, &model);

    quote! {
        #field_values
        #entity
        #lifecycle
    }
}

fn field_values_impl(input: &DeriveInput, model: &StructModel) -> Result<TokenStream, Error> {
    let ident = &input.ident;

    let match_arms = model.fields.iter().filter(|f| !f.skipped).map(|field| {
        let name = &field.name;
        let expr = value_expr(field);
        quote! {
            #name => Some(#expr),
        }
    });

    let record_entries = model.fields.iter().filter(|f| !f.skipped).map(|field| {
        let name = &field.name;
        let expr = value_expr(field);
        quote! {
            (#name.to_string(), #expr),
        }
    });

    Ok(quote! {
        impl ::helix::FieldValues for #ident {
            fn get_value(&self, field: &str) -> Option<::helix::Value> {
                match field {
                    #(#match_arms)*
                    _ => None,
                }
            }

            fn to_record(&self) -> ::helix::Value {
                ::helix::Value::Record(vec![
                    #(#record_entries)*
                ])
            }
        }
    })
}

fn entity_impl(input: &DeriveInput, model: &StructModel) -> Result<TokenStream, Error> {
    let ident = &input.ident;
    let entity_name = &model.entity_name;

    let mut ids = model.fields.iter().filter(|f| f.is_id);
    let id_field = ids.next().ok_or_else(|| {
        Error::new_spanned(
            ident,
            "Entity requires exactly one field marked #[entity(id)]",
        )
    })?;
    if ids.next().is_some() {
        return Err(Error::new_spanned(
            ident,
            "Entity supports a single-attribute identifier only",
        ));
    }

    let id_ident = &id_field.ident;
    let id_name = &id_field.name;
    let id_ty = &id_field.inner_ty;

    let (id_fn, assign_fn) = match id_field.cardinality {
        Cardinality::Optional => (
            quote! { self.#id_ident.clone() },
            quote! { self.#id_ident = Some(id); },
        ),
        Cardinality::One => (
            quote! { Some(self.#id_ident.clone()) },
            quote! { self.#id_ident = id; },
        ),
        Cardinality::Many => {
            return Err(Error::new_spanned(
                id_ident,
                "the identifier cannot be a collection",
            ));
        }
    };

    Ok(quote! {
        impl ::helix::Entity for #ident {
            type Id = #id_ty;

            const ENTITY_NAME: &'static str = #entity_name;
            const PRIMARY_KEY: &'static str = #id_name;

            fn id(&self) -> Option<Self::Id> {
                #id_fn
            }

            fn assign_id(&mut self, id: Self::Id) {
                #assign_fn
            }
        }
    })
}

fn lifecycle_impl(input: &DeriveInput, model: &StructModel) -> TokenStream {
    if model.custom_lifecycle {
        return TokenStream::new();
    }
    let ident = &input.ident;
    quote! {
        impl ::helix::Lifecycle for #ident {}
    }
}
