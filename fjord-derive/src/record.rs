//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, Fields, GenericArgument, Lit, Meta, PathArguments, Type};

enum FieldKind {
    Column { tag: Option<String> },
    Embed { optional: bool },
    Skip,
}

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ))
        }
    };

    let generic = input.generics.type_params().next().is_some();
    let mut record_generics = input.generics.clone();
    let mut describe = Vec::new();
    let mut describe_mut = Vec::new();
    let mut describe_embeds = Vec::new();
    let mut bindings = Vec::new();
    let mut embed_bindings = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.to_string();
        let field_name = field_name.trim_start_matches("r#");
        let ty = &field.ty;

        match field_kind(field)? {
            FieldKind::Skip => {}
            FieldKind::Column { tag } => {
                let tag = match tag {
                    Some(tag) => quote! { ::core::option::Option::Some(#tag) },
                    None => quote! { ::core::option::Option::None },
                };
                describe.push(quote! {
                    fields.push(::fjord::record::Field::new(#field_name, #tag, &self.#ident));
                });
                describe_mut.push(quote! {
                    fields.push(::fjord::record::FieldMut::new(#field_name, #tag, #ident));
                });
                bindings.push(ident.clone());
                if generic {
                    record_generics
                        .make_where_clause()
                        .predicates
                        .push(syn::parse_quote! { #ty: ::fjord::ToValue + ::fjord::FromValue });
                }
            }
            FieldKind::Embed { optional: true } => {
                describe.push(quote! {
                    ::fjord::Record::describe(&self.#ident, fields);
                });
                describe_embeds.push(quote! {
                    embeds.push(#ident);
                });
                embed_bindings.push(ident.clone());
                if generic {
                    record_generics
                        .make_where_clause()
                        .predicates
                        .push(syn::parse_quote! { #ty: ::fjord::Record + ::fjord::load::ScanEmbed });
                }
            }
            FieldKind::Embed { optional: false } => {
                describe.push(quote! {
                    ::fjord::Record::describe(&self.#ident, fields);
                });
                describe_mut.push(quote! {
                    ::fjord::Record::describe_mut(#ident, fields);
                });
                describe_embeds.push(quote! {
                    ::fjord::Record::describe_embeds(#ident, embeds);
                });
                bindings.push(ident.clone());
                embed_bindings.push(ident.clone());
                if generic {
                    record_generics
                        .make_where_clause()
                        .predicates
                        .push(syn::parse_quote! { #ty: ::fjord::Record });
                }
            }
        }
    }

    let (impl_generics, ty_generics, where_clause) = record_generics.split_for_impl();

    let mut load_where = record_generics.clone();
    load_where
        .make_where_clause()
        .predicates
        .push(syn::parse_quote! { Self: ::core::default::Default });
    let (_, _, load_where_clause) = load_where.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::fjord::Record for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn describe<'__fjord>(
                &'__fjord self,
                fields: &mut ::std::vec::Vec<::fjord::record::Field<'__fjord>>,
            ) {
                #(#describe)*
            }

            #[allow(unused_variables)]
            fn describe_mut<'__fjord>(
                &'__fjord mut self,
                fields: &mut ::std::vec::Vec<::fjord::record::FieldMut<'__fjord>>,
            ) {
                let Self { #(#bindings,)* .. } = self;
                #(#describe_mut)*
            }

            #[allow(unused_variables)]
            fn describe_embeds<'__fjord>(
                &'__fjord mut self,
                embeds: &mut ::std::vec::Vec<&'__fjord mut dyn ::fjord::load::ScanEmbed>,
            ) {
                let Self { #(#embed_bindings,)* .. } = self;
                #(#describe_embeds)*
            }
        }

        impl #impl_generics ::fjord::load::Load for #name #ty_generics #where_clause {
            fn load(
                &mut self,
                rows: ::std::vec::Vec<::fjord::load::Row>,
            ) -> ::fjord::Result<usize> {
                ::fjord::load::load_record(self, rows)
            }
        }

        impl #impl_generics ::fjord::load::FromRow for #name #ty_generics #load_where_clause {
            fn from_row(row: &::fjord::load::Row) -> ::fjord::Result<Self> {
                let mut record = <Self as ::core::default::Default>::default();
                ::fjord::load::scan_record(&mut record, row)?;
                ::core::result::Result::Ok(record)
            }
        }
    })
}

fn field_kind(field: &syn::Field) -> syn::Result<FieldKind> {
    let mut tag = None;
    let mut embed = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("db") {
            continue;
        }

        match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => tag = Some(s.value()),
                    other => {
                        return Err(syn::Error::new_spanned(other, "expected a string literal"))
                    }
                },
                other => return Err(syn::Error::new_spanned(other, "expected a string literal")),
            },
            Meta::List(_) => {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("embed") {
                        embed = true;
                        Ok(())
                    } else {
                        Err(meta.error("unknown db attribute, expected `embed`"))
                    }
                })?;
            }
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "expected `#[db = \"column\"]` or `#[db(embed)]`",
                ))
            }
        }
    }

    if embed {
        if tag.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "an embedded record cannot also carry a column tag",
            ));
        }
        return Ok(FieldKind::Embed {
            optional: option_inner(&field.ty).is_some(),
        });
    }

    match tag.as_deref() {
        Some("-") => Ok(FieldKind::Skip),
        _ => Ok(FieldKind::Column { tag }),
    }
}

/// `Option<T>` → `T`
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
