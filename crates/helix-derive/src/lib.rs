//! # helix-derive
//!
//! Derive macros for the local, single-type entity contracts:
//!
//! - `#[derive(Entity)]`: identity metadata (`Entity`), attribute
//!   access (`FieldValues`), and an empty `Lifecycle` impl unless the
//!   type opts into `#[entity(custom_lifecycle)]`.
//! - `#[derive(Embeddable)]`: attribute access only, for embeddables
//!   flattened into their owners.
//!
//! Descriptor containers are emitted by the `helix-build` generator,
//! which sees the whole entity graph; the derives handle everything a
//! single struct can answer about itself.

mod embeddable;
mod entity;
mod model;

use proc_macro::TokenStream;

#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input.into()).into()
}

#[proc_macro_derive(Embeddable, attributes(entity))]
pub fn derive_embeddable(input: TokenStream) -> TokenStream {
    embeddable::derive_embeddable(input.into()).into()
}
