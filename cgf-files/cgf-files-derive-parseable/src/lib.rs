extern crate proc_macro2;

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::{Data, DeriveInput, Fields, FieldsNamed, Ident, parse_macro_input, spanned::Spanned};

/// Reads every named field in declaration order, little endian.
#[proc_macro_derive(Parse)]
pub fn derive_parseable(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    derive_parse_internal(input).into()
}

/// Writes every named field in declaration order, mirroring `Parse`.
#[proc_macro_derive(Write)]
pub fn derive_writable(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    derive_write_internal(input).into()
}

fn files_crate() -> TokenStream {
    let found_crate = crate_name("cgf-files").expect("cgf-files is present in `Cargo.toml`");

    match found_crate {
        FoundCrate::Itself => quote!(crate),
        FoundCrate::Name(name) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(#ident)
        }
    }
}

fn named_fields<'a>(data: &'a Data, ident: &Ident, derive: &str) -> &'a FieldsNamed {
    match data {
        Data::Struct(s) => match s.fields {
            Fields::Named(ref fields) => fields,
            _ => panic!(
                "#[derive({})]` only supports named struct fields at the moment: {}",
                derive, ident
            ),
        },
        _ => panic!("`#[derive({})]` is only available on structs: {}", derive, ident),
    }
}

// put it into a separate function for testability
pub(crate) fn derive_parse_internal(input: DeriveInput) -> TokenStream {
    let crate_name = files_crate();
    let ident = input.ident;
    let fields = named_fields(&input.data, &ident, "Parse");

    // Qualified paths, so that arrays ([f32; 3]) and generics (Vec<T>) work as field types
    let recurse = fields.named.iter().map(|f| {
        let name = &f.ident;
        let ftype = &f.ty;
        quote_spanned! {f.span()=>
            #name: <#ftype as #crate_name::common::reader::Parseable<#ftype>>::parse(rdr)?,
        }
    });

    quote!(
        impl #crate_name::common::reader::Parseable<#ident> for #ident {
            fn parse<R: std::io::Read>(rdr: &mut R) -> Result<#ident, #crate_name::ChunkFileError> {
                Ok(#ident{
                    #(#recurse)*
                })
            }
        }

        impl #crate_name::common::reader::Parseable<Vec<#ident>> for Vec<#ident> {
            fn parse<R: std::io::Read>(rdr: &mut R) -> Result<Vec<#ident>, #crate_name::ChunkFileError> {
                Ok(#crate_name::common::reader::read_chunk_array(rdr)?)
            }
        }
    )
}

pub(crate) fn derive_write_internal(input: DeriveInput) -> TokenStream {
    let crate_name = files_crate();
    let ident = input.ident;
    let fields = named_fields(&input.data, &ident, "Write");

    let recurse = fields.named.iter().map(|f| {
        let name = &f.ident;
        quote_spanned! {f.span()=>
            #crate_name::common::writer::Writable::write(&self.#name, wtr)?;
        }
    });

    quote!(
        impl #crate_name::common::writer::Writable for #ident {
            fn write<W: std::io::Write>(&self, wtr: &mut W) -> Result<(), #crate_name::ChunkFileError> {
                #(#recurse)*
                Ok(())
            }
        }
    )
}
