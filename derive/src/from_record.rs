use std::collections::{HashMap, HashSet};

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, LitStr, Pat,
    PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_from_record(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromRecord` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromRecord` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    type Case = (LitStr, Ident, Option<(Type, ExprClosure)>);
    let mut field_methods: HashMap<&'static str, (Type, Vec<Case>)> = HashMap::new();
    let mut names = HashSet::new();

    for field in fields {
        if !names.insert(field.identifier.value()) {
            Err(Error::new_spanned(
                &field.identifier,
                "Field names must be unique.",
            ))?
        }

        for &method in field.kind.methods() {
            field_methods
                .entry(method)
                .or_insert_with(|| (field.primitive.clone(), Vec::new()))
                .1
                .push((
                    field.identifier.clone(),
                    field.name.clone(),
                    field.handler.clone(),
                ));
        }
    }

    let field_methods = field_methods.into_iter().map(|(method, (primitive, fields))| {
        let cases = fields.into_iter().map(|(identifier, name, handler)| {
            let assignment = if let Some((field_type, handler)) = handler {
                let body = handler.body;
                let acc = handler.inputs.iter().nth(0).unwrap();
                let val = handler.inputs.iter().nth(1).unwrap();

                quote! {
                    (|#acc: &mut #field_type, #val| {#body})(&mut self.#name, value)
                }
            } else {
                quote! {
                    self.#name = Some(::core::convert::Into::into(value))
                }
            };

            quote! { #identifier => { #assignment } }
        });

        let method = format_ident!("{}", method);

        quote! {
            fn #method(&mut self, field: &str, value: #primitive) {
                match field {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl FromRecord for #name {
            #(#field_methods)*
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    primitive: Type,
    kind: ValueKind,
    identifier: LitStr,
    handler: Option<(Type, ExprClosure)>,
}

/// The kind of value a struct field receives.
#[derive(Debug, Clone, Copy)]
enum ValueKind {
    Text,
    Integer,
    Decimal,
}

impl ValueKind {
    /// Receiver methods publishing values of this kind.
    fn methods(self) -> &'static [&'static str] {
        match self {
            ValueKind::Text => &["add_text", "add_date"],
            ValueKind::Integer => &["add_integer"],
            ValueKind::Decimal => &["add_decimal"],
        }
    }

    fn of(primitive: &Type) -> Result<Self> {
        let message = "Field value type must be `String` or `&str`, `i128`, or `Decimal`.";

        let ident = match primitive {
            Type::Reference(reference) => match &*reference.elem {
                Type::Path(path) if path.path.is_ident("str") => return Ok(ValueKind::Text),
                _ => Err(Error::new_spanned(primitive, message))?,
            },
            Type::Path(path) => match path.path.segments.last() {
                Some(segment) => &segment.ident,
                None => Err(Error::new_spanned(primitive, message))?,
            },
            _ => Err(Error::new_spanned(primitive, message))?,
        };

        if ident == "String" {
            Ok(ValueKind::Text)
        } else if ident == "i128" {
            Ok(ValueKind::Integer)
        } else if ident == "Decimal" {
            Ok(ValueKind::Decimal)
        } else {
            Err(Error::new_spanned(primitive, message))
        }
    }
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let FieldAttribute {
            identifier,
            handler,
        } = attr.meta.require_list()?.parse_args()?;

        let (kind, primitive) = if let Some(handler) = &handler {
            let Some(parameter) = handler.inputs.iter().nth(1) else {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            };

            let Pat::Type(pat_type) = parameter else {
                Err(Error::new_spanned(
                    parameter,
                    "Handler closure's second parameter must be annotated with the expected value type.",
                ))?
            };

            (ValueKind::of(&pat_type.ty)?, (*pat_type.ty).clone())
        } else {
            let Type::Path(path) = &field.ty else {
                Err(Error::new_spanned(
                    &field.ty,
                    "Field must have a type annotation.",
                ))?
            };

            let Some(segment) = path.path.segments.first() else {
                Err(Error::new_spanned(
                    &path.path.segments,
                    "Field must have a type annotation.",
                ))?
            };

            if segment.ident != "Option" {
                Err(Error::new_spanned(
                    &segment.ident,
                    "Field without a handler must have type `Option<T>`.",
                ))?
            }

            let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
                Err(Error::new_spanned(
                    &segment.arguments,
                    "Field of type `Option<T>` must have a generic parameter.",
                ))?
            };

            let Some(argument) = arguments.args.first() else {
                Err(Error::new_spanned(
                    &arguments.args,
                    "Field of type `Option<T>` must have a generic parameter.",
                ))?
            };

            let GenericArgument::Type(inner_type) = argument else {
                Err(Error::new_spanned(
                    argument,
                    "Generic argument of a field of type `Option<T>` must be a type.",
                ))?
            };

            let kind = ValueKind::of(inner_type)?;

            // Text is published borrowed, and converted on assignment.
            let primitive = match kind {
                ValueKind::Text => syn::parse_quote!(&str),
                _ => inner_type.clone(),
            };

            (kind, primitive)
        };

        let handler = handler.map(|h| (field.ty.clone(), h));

        Ok(Some(Self {
            name,
            primitive,
            kind,
            identifier,
            handler,
        }))
    }
}

#[derive(Debug)]
struct FieldAttribute {
    identifier: LitStr,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let identifier = input.parse::<LitStr>()?;

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self {
            identifier,
            handler,
        })
    }
}
