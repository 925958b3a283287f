//! 请求属性解析器
//!
//! 每种数据来源对应一个解析器，按注册顺序匹配（第一个 `supports` 返回 true 的获胜）。
//! 解析器返回 `Ok(None)` 表示请求中没有值，该属性保持默认值。
//!
//! 自定义解析器：
//!
//! ```ignore
//! struct TenantResolver;
//!
//! impl RequestPropertyResolverBase for TenantResolver {
//!     fn supports(&self, property: &BindingProperty) -> bool {
//!         property.has_annotation(AnnotationKind::Custom("Tenant"))
//!     }
//! }
//!
//! #[async_trait]
//! impl RequestPropertyResolver for TenantResolver {
//!     async fn resolve(&self, _: &BindingProperty, request: &WebRequest)
//!         -> Result<Option<PropertyValue>, ResolveError> {
//!         Ok(request.headers().get("x-tenant").and_then(|v| v.to_str().ok()).map(Into::into))
//!     }
//! }
//! ```

mod cookie_parameter;
mod form_parameter;
mod header_parameter;
mod path_parameter;
mod request_body;
mod request_context;
mod request_parameter;
mod session_parameter;

pub use cookie_parameter::CookieParameterRequestPropertyResolver;
pub use form_parameter::{FormParameterMapRequestPropertyResolver, FormParameterRequestPropertyResolver};
pub use header_parameter::{HeaderParameterMapRequestPropertyResolver, HeaderParameterRequestPropertyResolver};
pub use path_parameter::{PathParameterMapRequestPropertyResolver, PathParameterRequestPropertyResolver};
pub use request_body::RequestBodyRequestPropertyResolver;
pub use request_context::RequestContextRequestPropertyResolver;
pub use request_parameter::{
    RequestParameterMapRequestPropertyResolver, RequestParameterRequestPropertyResolver,
};
pub use session_parameter::SessionParameterRequestPropertyResolver;

use std::sync::Arc;

use async_trait::async_trait;
use chimera_bind::{
    Annotation, AnnotationKind, BindingProperty, PropertyResolverRegistry, PropertyValue, RequestPropertyResolverBase,
};

use crate::error::ResolveError;
use crate::request::{MultiValueMap, WebRequest};

/// 异步请求属性解析器
#[async_trait]
pub trait RequestPropertyResolver: RequestPropertyResolverBase {
    /// 从请求中解析属性值
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError>;
}

/// Web 解析器注册表
pub type ResolverRegistry = PropertyResolverRegistry<dyn RequestPropertyResolver>;

/// 默认解析器注册表，按固定顺序包含所有内置解析器
pub fn default_property_resolver_registry() -> ResolverRegistry {
    let mut registry = ResolverRegistry::new();
    registry
        .add_resolver(Arc::new(RequestParameterRequestPropertyResolver))
        .add_resolver(Arc::new(RequestParameterMapRequestPropertyResolver))
        .add_resolver(Arc::new(FormParameterRequestPropertyResolver))
        .add_resolver(Arc::new(FormParameterMapRequestPropertyResolver))
        .add_resolver(Arc::new(PathParameterRequestPropertyResolver))
        .add_resolver(Arc::new(PathParameterMapRequestPropertyResolver))
        .add_resolver(Arc::new(CookieParameterRequestPropertyResolver))
        .add_resolver(Arc::new(HeaderParameterRequestPropertyResolver))
        .add_resolver(Arc::new(HeaderParameterMapRequestPropertyResolver))
        .add_resolver(Arc::new(SessionParameterRequestPropertyResolver))
        .add_resolver(Arc::new(RequestContextRequestPropertyResolver))
        .add_resolver(Arc::new(RequestBodyRequestPropertyResolver));
    registry
}

/// 带非空名称的注解
fn named_annotation(property: &BindingProperty, kind: AnnotationKind) -> Option<&str> {
    property.get_annotation(kind).and_then(Annotation::name)
}

/// 注解存在且带非空名称
fn supports_named(property: &BindingProperty, kind: AnnotationKind) -> bool {
    named_annotation(property, kind).is_some()
}

/// 注解存在、没有名称且属性类型为 Map
fn supports_unnamed_map(property: &BindingProperty, kind: AnnotationKind) -> bool {
    property.has_annotation(kind)
        && named_annotation(property, kind).is_none()
        && property.get_type().is_map()
}

/// 取注解名称，注解缺失时报错
fn required_name(property: &BindingProperty, kind: AnnotationKind) -> Result<&str, ResolveError> {
    match property.get_annotation(kind) {
        Some(annotation) => Ok(annotation.name().unwrap_or("")),
        None => Err(ResolveError::missing_annotation(kind.name(), property.name())),
    }
}

fn require_annotation(property: &BindingProperty, kind: AnnotationKind) -> Result<(), ResolveError> {
    required_name(property, kind).map(|_| ())
}

/// 按属性类型把多值 Map 转为 `MultiMap` 或单值 `Map`
fn map_value(property: &BindingProperty, values: MultiValueMap) -> PropertyValue {
    if property.get_type().is_multi_value_map() {
        PropertyValue::MultiMap(values)
    } else {
        PropertyValue::Map(
            values
                .into_iter()
                .filter_map(|(k, mut v)| if v.is_empty() { None } else { Some((k, v.remove(0))) })
                .collect(),
        )
    }
}
