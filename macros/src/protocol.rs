//! Derives for the wire `Encode` and `Decode` traits.
//!
//! Structs encode their fields in declaration order. Enums are
//! prefixed by a discriminant (a VarInt packet ID, or a single byte)
//! chosen per variant with `#[encoding(id = ...)]`.

use darling::{FromDeriveInput, FromField, FromMeta, FromVariant};
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{Data, DataEnum, DataStruct, DeriveInput, Fields};

#[derive(Default, Debug, FromField)]
#[darling(attributes(encoding), forward_attrs(allow, doc, cfg))]
#[darling(default)]
struct FieldOptions {
    /// Write the (integer) field as a VarInt.
    varint: bool,
    /// `Option<T>` field preceded by a presence boolean.
    bool_prefixed: bool,
    /// `Vec<T>` field; selects how the element count is carried.
    length_prefix: Option<LengthPrefix>,
}

#[derive(Debug, Clone, Copy, FromMeta)]
enum LengthPrefix {
    #[darling(rename = "varint")]
    VarInt,
    /// Elements run to the end of the packet. Last field only.
    #[darling(rename = "inferred")]
    Inferred,
}

/// How a single field is put on the wire, resolved from its options.
#[derive(Debug, Clone, Copy)]
enum FieldCodec {
    Plain,
    VarInt,
    BoolPrefixed,
    List(LengthPrefix),
}

impl FieldCodec {
    fn resolve(options: &FieldOptions, span: Span) -> syn::Result<Self> {
        let selected = [
            options.varint.then_some(FieldCodec::VarInt),
            options.bool_prefixed.then_some(FieldCodec::BoolPrefixed),
            options.length_prefix.map(FieldCodec::List),
        ];
        let mut selected = selected.into_iter().flatten();
        let codec = selected.next().unwrap_or(FieldCodec::Plain);
        if selected.next().is_some() {
            return Err(syn::Error::new(
                span,
                "at most one of `varint`, `bool_prefixed` and `length_prefix` may be set",
            ));
        }
        Ok(codec)
    }
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(encoding), forward_attrs(allow, doc, cfg))]
struct EnumOptions {
    discriminant: Discriminant,
}

#[derive(Debug, Clone, Copy, FromMeta)]
enum Discriminant {
    #[darling(rename = "varint")]
    VarInt,
    #[darling(rename = "byte")]
    Byte,
}

#[derive(Debug, FromVariant)]
#[darling(attributes(encoding), forward_attrs(allow, doc, cfg))]
struct VariantOptions {
    id: i64,
}

#[derive(Debug)]
struct FieldInput {
    ident: Ident,
    ty: syn::Type,
    /// Expression yielding the field value inside `encode`.
    access: TokenStream,
    codec: FieldCodec,
}

#[derive(Debug)]
enum Shape {
    Unit,
    Named,
    Newtype,
}

#[derive(Debug)]
struct VariantInput {
    ident: Ident,
    id: i64,
    shape: Shape,
    fields: Vec<FieldInput>,
}

#[derive(Debug)]
enum Input {
    Struct(Vec<FieldInput>),
    Enum {
        discriminant: Discriminant,
        variants: Vec<VariantInput>,
    },
}

fn parse_input(input: &DeriveInput) -> syn::Result<Input> {
    match &input.data {
        Data::Struct(data) => parse_struct(data).map(Input::Struct),
        Data::Enum(data) => parse_enum(data, input),
        Data::Union(data) => Err(syn::Error::new_spanned(
            data.union_token,
            "cannot derive Encode/Decode on a union",
        )),
    }
}

fn parse_field(field: &syn::Field, ident: Ident, access: TokenStream) -> syn::Result<FieldInput> {
    let options = FieldOptions::from_field(field)?;
    let codec = FieldCodec::resolve(&options, ident.span())?;
    Ok(FieldInput {
        ident,
        ty: field.ty.clone(),
        access,
        codec,
    })
}

fn parse_struct(data: &DataStruct) -> syn::Result<Vec<FieldInput>> {
    match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|field| {
                let ident = field.ident.clone().expect("named field");
                let access = quote! { self.#ident };
                parse_field(field, ident, access)
            })
            .collect(),
        Fields::Unnamed(unnamed) => Err(syn::Error::new_spanned(
            unnamed,
            "tuple structs are unsupported",
        )),
        Fields::Unit => Ok(Vec::new()),
    }
}

fn parse_enum(data: &DataEnum, input: &DeriveInput) -> syn::Result<Input> {
    let options = EnumOptions::from_derive_input(input)?;
    let mut variants = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        let VariantOptions { id } = VariantOptions::from_variant(variant)?;
        let (shape, fields) = match &variant.fields {
            Fields::Unit => (Shape::Unit, Vec::new()),
            Fields::Named(named) => {
                let fields = named
                    .named
                    .iter()
                    .map(|field| {
                        let ident = field.ident.clone().expect("named field");
                        let access = quote! { (*#ident) };
                        parse_field(field, ident, access)
                    })
                    .collect::<syn::Result<_>>()?;
                (Shape::Named, fields)
            }
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                let ident = Ident::new("__payload", Span::call_site());
                let field = parse_field(&unnamed.unnamed[0], ident, quote! { (*__payload) })?;
                (Shape::Newtype, vec![field])
            }
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new_spanned(
                    unnamed,
                    "variants may hold at most one unnamed field",
                ))
            }
        };
        variants.push(VariantInput {
            ident: variant.ident.clone(),
            id,
            shape,
            fields,
        });
    }

    Ok(Input::Enum {
        discriminant: options.discriminant,
        variants,
    })
}

fn encode_field(field: &FieldInput) -> TokenStream {
    let access = &field.access;
    match field.codec {
        FieldCodec::Plain => quote! {
            crate::protocol::Encode::encode(&#access, encoder);
        },
        FieldCodec::VarInt => quote! {
            encoder.write_var_int(#access.try_into().unwrap_or(i32::MAX));
        },
        FieldCodec::BoolPrefixed => quote! {
            encoder.write_bool(#access.is_some());
            if let Some(value) = &#access {
                crate::protocol::Encode::encode(value, encoder);
            }
        },
        FieldCodec::List(prefix) => {
            let length = match prefix {
                LengthPrefix::VarInt => quote! {
                    encoder.write_var_int(#access.len().try_into().unwrap_or(i32::MAX));
                },
                LengthPrefix::Inferred => TokenStream::new(),
            };
            quote! {
                #length
                for item in &#access {
                    crate::protocol::Encode::encode(item, encoder);
                }
            }
        }
    }
}

fn decode_field(field: &FieldInput) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    match field.codec {
        FieldCodec::Plain => quote! {
            let #ident: #ty = crate::protocol::Decode::decode(decoder)?;
        },
        FieldCodec::VarInt => quote! {
            let #ident: #ty = decoder.read_var_int()?.try_into()?;
        },
        FieldCodec::BoolPrefixed => quote! {
            let #ident: #ty = if decoder.read_bool()? {
                Some(crate::protocol::Decode::decode(decoder)?)
            } else {
                None
            };
        },
        FieldCodec::List(LengthPrefix::VarInt) => quote! {
            let #ident: #ty = {
                let count = usize::try_from(decoder.read_var_int()?)?;
                let mut items = Vec::with_capacity(count.min(decoder.buffer().len()));
                for _ in 0..count {
                    items.push(crate::protocol::Decode::decode(decoder)?);
                }
                items
            };
        },
        FieldCodec::List(LengthPrefix::Inferred) => quote! {
            let mut #ident: #ty = Vec::new();
            while !decoder.is_finished() {
                #ident.push(crate::protocol::Decode::decode(decoder)?);
            }
        },
    }
}

fn write_discriminant(discriminant: Discriminant, id: i64) -> syn::Result<TokenStream> {
    let overflow = || syn::Error::new(Span::call_site(), format!("id {id} out of range"));
    Ok(match discriminant {
        Discriminant::VarInt => {
            let id = i32::try_from(id).map_err(|_| overflow())?;
            quote! { encoder.write_var_int(#id); }
        }
        Discriminant::Byte => {
            let id = u8::try_from(id).map_err(|_| overflow())?;
            quote! { encoder.write_u8(#id); }
        }
    })
}

fn variant_pattern(variant: &VariantInput) -> TokenStream {
    let ident = &variant.ident;
    let bindings = variant.fields.iter().map(|field| &field.ident);
    match variant.shape {
        Shape::Unit => quote! { Self::#ident },
        Shape::Named => quote! { Self::#ident { #(#bindings),* } },
        Shape::Newtype => quote! { Self::#ident(#(#bindings)*) },
    }
}

fn encode_body(input: &Input) -> syn::Result<TokenStream> {
    match input {
        Input::Struct(fields) => {
            let fields = fields.iter().map(encode_field);
            Ok(quote! { #(#fields)* })
        }
        Input::Enum {
            discriminant,
            variants,
        } => {
            let mut arms = Vec::with_capacity(variants.len());
            for variant in variants {
                let pattern = variant_pattern(variant);
                let id = write_discriminant(*discriminant, variant.id)?;
                let fields = variant.fields.iter().map(encode_field);
                arms.push(quote! {
                    #pattern => {
                        #id
                        #(#fields)*
                    }
                });
            }
            Ok(quote! {
                match self {
                    #(#arms)*
                }
            })
        }
    }
}

fn decode_body(input: &Input) -> TokenStream {
    match input {
        Input::Struct(fields) => {
            let decode = fields.iter().map(decode_field);
            let idents = fields.iter().map(|field| &field.ident);
            quote! {
                #(#decode)*
                Ok(Self { #(#idents),* })
            }
        }
        Input::Enum {
            discriminant,
            variants,
        } => {
            let read_id = match discriminant {
                Discriminant::VarInt => quote! { i64::from(decoder.read_var_int()?) },
                Discriminant::Byte => quote! { i64::from(decoder.read_u8()?) },
            };
            let arms = variants.iter().map(|variant| {
                let id = variant.id;
                let decode = variant.fields.iter().map(decode_field);
                let construct = variant_pattern(variant);
                quote! {
                    #id => {
                        #(#decode)*
                        Ok(#construct)
                    }
                }
            });
            quote! {
                let discriminant = #read_id;
                match discriminant {
                    #(#arms)*
                    other => Err(crate::protocol::DecodeError::UnknownDiscriminant(other)),
                }
            }
        }
    }
}

pub fn derive_encode_on(derive_input: &DeriveInput) -> syn::Result<TokenStream> {
    let input = parse_input(derive_input)?;
    let ident = &derive_input.ident;
    let body = encode_body(&input)?;
    Ok(quote! {
        impl crate::protocol::Encode for #ident {
            fn encode(&self, encoder: &mut crate::protocol::Encoder) {
                #body
            }
        }
    })
}

pub fn derive_decode_on(derive_input: &DeriveInput) -> syn::Result<TokenStream> {
    let input = parse_input(derive_input)?;
    let ident = &derive_input.ident;
    let body = decode_body(&input);
    let discriminated = discriminated_impl(&input, ident);
    Ok(quote! {
        impl crate::protocol::Decode for #ident {
            fn decode(
                decoder: &mut crate::protocol::Decoder,
            ) -> ::std::result::Result<Self, crate::protocol::DecodeError> {
                #body
            }
        }

        #discriminated
    })
}

/// Enums also learn which discriminants they accept, so a packet ID can be
/// looked up before its body is read.
fn discriminated_impl(input: &Input, ident: &Ident) -> TokenStream {
    let Input::Enum { variants, .. } = input else {
        return TokenStream::new();
    };
    let ids = variants.iter().map(|variant| variant.id);
    quote! {
        impl crate::protocol::Discriminated for #ident {
            fn has_discriminant(discriminant: i64) -> bool {
                [#(#ids),*].contains(&discriminant)
            }
        }
    }
}
