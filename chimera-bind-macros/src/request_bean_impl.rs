use proc_macro::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use crate::attribute_helpers::{field_annotations, has_request_bean, is_option_type, option_inner_type};

pub fn derive_request_bean_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => abort!(name, "RequestBean only supports structs with named fields"),
        },
        _ => abort!(name, "RequestBean can only be derived for structs"),
    };

    let mut descriptors = Vec::new();
    let mut setters = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let property = field_ident.to_string().trim_start_matches("r#").to_string();
        let field_type = &field.ty;
        let annotations = field_annotations(&field.attrs);
        let annotation_exprs = &annotations.annotations;
        if let Some(message) = annotations.conflict() {
            abort!(field, "{}", message);
        }

        // 嵌套 Bean：只有 #[bean_parameter]，没有其他数据来源
        let nested = annotations.is_bean_parameter;

        // `Option<T>` 请求体按 `T` 反序列化，空请求体保持 `None`
        let body_type = option_inner_type(field_type).unwrap_or(field_type);

        let type_info = if annotations.is_body {
            quote! { ::chimera_bind::TypeInfo::deserializable::<#body_type>() }
        } else if annotations.is_session {
            quote! { ::chimera_bind::TypeInfo::deserializable::<#field_type>() }
        } else if annotations.has_source || nested {
            quote! { <#field_type as ::chimera_bind::Reflect>::type_info() }
        } else {
            quote! { ::chimera_bind::TypeInfo::opaque::<#field_type>() }
        };

        descriptors.push(quote! {
            ::chimera_bind::PropertyDescriptor::field(#property, owner.clone(), #type_info)
                #(.with_field_annotation(#annotation_exprs))*
        });

        if nested {
            let target = if is_option_type(field_type) {
                quote! { self.#field_ident.get_or_insert_with(::core::default::Default::default) }
            } else {
                quote! { &mut self.#field_ident }
            };
            setters.push(quote! {
                (#property, ::core::option::Option::Some(rest)) => ::chimera_bind::PropertyAccessor::set_property_value(#target, rest, value)
                    .map_err(|e| e.nested(#property)),
            });
        } else if annotations.is_body {
            let wrap = if is_option_type(field_type) {
                quote! { ::core::option::Option::Some(body) }
            } else {
                quote! { body }
            };
            setters.push(quote! {
                (#property, ::core::option::Option::None) => {
                    let body = value
                        .downcast::<#body_type>()
                        .map_err(|e| ::chimera_bind::PropertyAccessError::type_mismatch(#property, e))?;
                    self.#field_ident = #wrap;
                    ::core::result::Result::Ok(())
                }
            });
        } else if annotations.is_session {
            setters.push(quote! {
                (#property, ::core::option::Option::None) => {
                    self.#field_ident = ::chimera_bind::deserialize_value::<#field_type>(value)
                        .map_err(|e| ::chimera_bind::PropertyAccessError::type_mismatch(#property, e))?;
                    ::core::result::Result::Ok(())
                }
            });
        } else if annotations.has_source {
            setters.push(quote! {
                (#property, ::core::option::Option::None) => {
                    self.#field_ident = <#field_type as ::chimera_bind::FromPropertyValue>::from_property_value(value)
                        .map_err(|e| ::chimera_bind::PropertyAccessError::type_mismatch(#property, e))?;
                    ::core::result::Result::Ok(())
                }
            });
        }
    }

    let registration = if has_request_bean(&input.attrs) {
        if !input.generics.params.is_empty() {
            abort!(name, "#[request_bean] cannot be used on generic types");
        }
        quote! {
            ::chimera_bind::inventory::submit! {
                ::chimera_bind::RequestBeanRegistration {
                    type_name: ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#name)),
                    module_path: ::core::module_path!(),
                    type_info: <#name as ::chimera_bind::Reflect>::type_info,
                }
            }
        }
    } else {
        quote! {}
    };

    let expanded = quote! {
        impl #impl_generics ::chimera_bind::Reflect for #name #ty_generics #where_clause {
            fn type_info() -> ::chimera_bind::TypeInfo {
                ::chimera_bind::TypeInfo::bean::<Self>(<Self as ::chimera_bind::RequestBean>::property_descriptors)
            }
        }

        impl #impl_generics ::chimera_bind::RequestBean for #name #ty_generics #where_clause {
            fn property_descriptors() -> ::core::result::Result<
                ::std::vec::Vec<::chimera_bind::PropertyDescriptor>,
                ::chimera_bind::IntrospectionError,
            > {
                #[allow(unused_variables)]
                let owner = <Self as ::chimera_bind::Reflect>::type_info();
                ::core::result::Result::Ok(::std::vec![
                    #(#descriptors),*
                ])
            }
        }

        impl #impl_generics ::chimera_bind::PropertyAccessor for #name #ty_generics #where_clause {
            #[allow(unused_variables, unreachable_patterns)]
            fn set_property_value(
                &mut self,
                path: &str,
                value: ::chimera_bind::PropertyValue,
            ) -> ::core::result::Result<(), ::chimera_bind::PropertyAccessError> {
                let (head, rest) = match path.split_once('.') {
                    ::core::option::Option::Some((head, rest)) => (head, ::core::option::Option::Some(rest)),
                    ::core::option::Option::None => (path, ::core::option::Option::None),
                };
                match (head, rest) {
                    #(#setters)*
                    _ => ::core::result::Result::Err(::chimera_bind::PropertyAccessError::not_writable(path)),
                }
            }
        }

        #registration
    };

    TokenStream::from(expanded)
}
