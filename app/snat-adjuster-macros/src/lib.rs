use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, punctuated::Punctuated, spanned::Spanned, token::Comma, Data, DeriveInput,
    Error, Field, Fields, Ident,
};

/// Implements `crate::output::TableOutputRow` for a struct with named fields.
///
/// Every field becomes a column (rendered with `ToString`), the field marked with
/// `#[name_column]` is what `--output names` prints.
#[proc_macro_derive(TableOutputRow, attributes(name_column))]
pub fn derive_table_output_row(input: TokenStream) -> TokenStream {
    let parsed_input = parse_macro_input!(input as DeriveInput);

    expand_table_output_row(parsed_input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_table_output_row(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_ident = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "TableOutputRow needs named fields!")),
        },
        _ => return Err(Error::new(input.span(), "TableOutputRow only supports structs!")),
    };

    let name_field = get_name_column_field(fields, struct_ident)?;
    let column_names = get_column_names(fields);
    let field_names = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .collect::<Vec<_>>();
    let field_count = field_names.len();

    Ok(quote! {
        impl #impl_generics crate::output::TableOutputRow for #struct_ident #type_generics #where_clause {
            fn get_name(&self) -> ::std::string::String {
                ::std::string::ToString::to_string(&self.#name_field)
            }

            fn get_column_names() -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::borrow::ToOwned::to_owned(#column_names)),*]
            }

            fn get_column_count() -> usize {
                #field_count
            }

            fn get_row(&self) -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::ToString::to_string(&self.#field_names)),*]
            }
        }
    })
}

/// `source_cidr` becomes `SOURCE CIDR`
fn get_column_names(fields: &Punctuated<Field, Comma>) -> Vec<String> {
    fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .map(|ident| ident.to_string().to_uppercase().replace('_', " "))
        .collect()
}

fn get_name_column_field<'a>(
    fields: &'a Punctuated<Field, Comma>,
    struct_ident: &Ident,
) -> syn::Result<&'a Ident> {
    let mut marked = fields.iter().filter(|f| {
        f.attrs
            .iter()
            .any(|a| a.meta.path().is_ident("name_column"))
    });

    let field = marked.next().ok_or_else(|| {
        Error::new(
            struct_ident.span(),
            "One field has to be marked with #[name_column]!",
        )
    })?;

    if let Some(duplicate) = marked.next() {
        return Err(Error::new(
            duplicate.span(),
            "Only one field can be marked with #[name_column]!",
        ));
    }

    field
        .ident
        .as_ref()
        .ok_or_else(|| Error::new(field.span(), "The name column needs to be a named field!"))
}
