//! Derive macros for the server's packet definitions.
//!
//! * `Encode` / `Decode` generate the wire codec for a packet struct or a
//!   packet enum (see the `protocol` module for the accepted
//!   `#[encoding(...)]` options).
//! * `FromVariants` generates `From<Payload> for Enum` for every
//!   single-field tuple variant, so a packet body can be sent with
//!   `.into()`.

use syn::DeriveInput;

mod from_variants;
mod protocol;

#[proc_macro_derive(Encode, attributes(encoding))]
pub fn derive_encode(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    protocol::derive_encode_on(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(Decode, attributes(encoding))]
pub fn derive_decode(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    protocol::derive_decode_on(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(FromVariants)]
pub fn derive_from_variants(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    from_variants::derive_from_variants_on(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
