use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

/// Emits `From<T> for Enum` for each variant of the form `Variant(T)`.
/// Unit and struct-like variants are skipped.
pub fn derive_from_variants_on(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "FromVariants can only be derived for enums",
        ));
    };

    let enum_ident = &input.ident;
    let impls = data.variants.iter().filter_map(|variant| {
        let Fields::Unnamed(fields) = &variant.fields else {
            return None;
        };
        let [field] = fields.unnamed.iter().collect::<Vec<_>>()[..] else {
            return None;
        };
        let variant_ident = &variant.ident;
        let ty = &field.ty;
        Some(quote! {
            impl ::std::convert::From<#ty> for #enum_ident {
                fn from(payload: #ty) -> Self {
                    Self::#variant_ident(payload)
                }
            }
        })
    });

    Ok(quote! {
        #(#impls)*
    })
}
