use crate::model::{parse_struct, value_expr};
use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

// derive_embeddable
pub(crate) fn derive_embeddable(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let model = match parse_struct(&input) {
        Ok(model) => model,
        Err(err) => return err.to_compile_error(),
    };

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

    quote! {
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
    }
}
