//! 宏辅助工具函数

use proc_macro2::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{Attribute, GenericArgument, LitStr, PathArguments, Token, Type};

/// 字段属性名 -> `AnnotationKind` 变体
const SOURCE_ATTRIBUTES: &[(&str, &str)] = &[
    ("request_parameter", "RequestParameter"),
    ("form_parameter", "FormParameter"),
    ("path_parameter", "PathParameter"),
    ("cookie_parameter", "CookieParameter"),
    ("header_parameter", "HeaderParameter"),
    ("session_parameter", "SessionParameter"),
    ("request_body", "RequestBody"),
    ("request_context", "RequestContext"),
];

/// 字段上的绑定注解
pub(crate) struct FieldAnnotations {
    /// 生成 `Annotation` 的表达式
    pub annotations: Vec<TokenStream>,
    /// 标注了数据来源（包括自定义注解）
    pub has_source: bool,
    pub is_body: bool,
    /// Session 属性，通过 serde 反序列化
    pub is_session: bool,
    pub is_bean_parameter: bool,
}

impl FieldAnnotations {
    /// 注解组合不合法时返回错误信息
    ///
    /// 自省时 `#[bean_parameter]` 优先于数据来源，两者同时出现会让写入与解析计划不一致
    pub fn conflict(&self) -> Option<&'static str> {
        if self.is_bean_parameter && self.has_source {
            return Some("#[bean_parameter] cannot be combined with a data source attribute");
        }
        if self.is_body && self.is_session {
            return Some("#[request_body] cannot be combined with #[session_parameter]");
        }
        None
    }
}

/// 解析字段上的绑定注解
pub(crate) fn field_annotations(attrs: &[Attribute]) -> FieldAnnotations {
    let mut result = FieldAnnotations {
        annotations: Vec::new(),
        has_source: false,
        is_body: false,
        is_session: false,
        is_bean_parameter: false,
    };

    for attr in attrs {
        if attr.path().is_ident("bean_parameter") {
            result.is_bean_parameter = true;
            result
                .annotations
                .push(annotation_tokens(quote! { BeanParameter }, None));
            continue;
        }

        if attr.path().is_ident("request_annotation") {
            let args = string_args(attr);
            let (kind, value) = match args.as_slice() {
                [kind] => (kind.clone(), None),
                [kind, value] => (kind.clone(), Some(value.clone())),
                _ => abort!(
                    attr,
                    "expected #[request_annotation(\"Kind\")] or #[request_annotation(\"Kind\", \"value\")]"
                ),
            };
            result.has_source = true;
            result
                .annotations
                .push(annotation_tokens(quote! { Custom(#kind) }, value));
            continue;
        }

        let Some((_, variant)) = SOURCE_ATTRIBUTES
            .iter()
            .find(|(name, _)| attr.path().is_ident(name))
        else {
            continue;
        };

        let value = match string_args(attr).as_slice() {
            [] => None,
            [value] => Some(value.clone()),
            _ => abort!(attr, "expected at most one name"),
        };

        result.has_source = true;
        result.is_body |= *variant == "RequestBody";
        result.is_session |= *variant == "SessionParameter";
        let variant = syn::Ident::new(variant, proc_macro2::Span::call_site());
        result
            .annotations
            .push(annotation_tokens(quote! { #variant }, value));
    }

    result
}

fn annotation_tokens(kind: TokenStream, value: Option<LitStr>) -> TokenStream {
    match value {
        Some(value) => quote! {
            ::chimera_bind::Annotation::named(::chimera_bind::AnnotationKind::#kind, #value)
        },
        None => quote! {
            ::chimera_bind::Annotation::new(::chimera_bind::AnnotationKind::#kind)
        },
    }
}

/// `#[attr]`、`#[attr("a")]`、`#[attr("a", "b")]`
fn string_args(attr: &Attribute) -> Vec<LitStr> {
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Vec::new();
    }
    match attr.parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated) {
        Ok(args) => args.into_iter().collect(),
        Err(e) => abort!(e.span(), "expected string literal arguments: {}", e),
    }
}

/// 容器上是否标注了 `#[request_bean]`
pub(crate) fn has_request_bean(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("request_bean"))
}

/// 是否为 `Option<T>`
pub(crate) fn is_option_type(ty: &Type) -> bool {
    option_inner_type(ty).is_some()
}

pub(crate) fn option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_source_attributes() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[session_parameter("user")])];
        let annotations = field_annotations(&attrs);
        assert!(annotations.has_source);
        assert!(annotations.is_session);
        assert!(!annotations.is_body);
        assert_eq!(annotations.annotations.len(), 1);
        assert!(annotations.conflict().is_none());
    }

    #[test]
    fn test_bean_parameter_with_source_conflicts() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[bean_parameter]),
            parse_quote!(#[request_parameter("page")]),
        ];
        assert!(field_annotations(&attrs).conflict().is_some());

        let attrs: Vec<Attribute> = vec![parse_quote!(#[bean_parameter]), parse_quote!(#[validate(nested)])];
        let annotations = field_annotations(&attrs);
        assert!(annotations.is_bean_parameter);
        assert!(annotations.conflict().is_none());
    }

    #[test]
    fn test_option_inner_type() {
        let ty: Type = parse_quote!(Option<User>);
        let inner: Type = parse_quote!(User);
        assert_eq!(option_inner_type(&ty), Some(&inner));
        assert!(!is_option_type(&parse_quote!(Vec<User>)));
    }
}
