//! 请求上下文解析器

use std::any::TypeId;

use async_trait::async_trait;
use axum::http::{HeaderMap, Method, Uri, Version};
use chimera_bind::{AnnotationKind, BindingProperty, PropertyValue, RequestPropertyResolverBase};

use super::{require_annotation, RequestPropertyResolver};
use crate::error::ResolveError;
use crate::locale::Locale;
use crate::request::WebRequest;
use crate::session::Session;

/// `#[request_context]`：按属性类型注入请求上下文对象
///
/// 支持 `Method`、`Uri`、`Version`、`HeaderMap`、`Session`、`Locale`（以及它们的 `Option`）
pub struct RequestContextRequestPropertyResolver;

fn context_type(property: &BindingProperty) -> TypeId {
    property.get_type().unwrap_optional().type_id()
}

fn is_context_type(type_id: TypeId) -> bool {
    [
        TypeId::of::<Method>(),
        TypeId::of::<Uri>(),
        TypeId::of::<Version>(),
        TypeId::of::<HeaderMap>(),
        TypeId::of::<Session>(),
        TypeId::of::<Locale>(),
    ]
    .contains(&type_id)
}

impl RequestPropertyResolverBase for RequestContextRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        property.has_annotation(AnnotationKind::RequestContext) && is_context_type(context_type(property))
    }
}

#[async_trait]
impl RequestPropertyResolver for RequestContextRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        require_annotation(property, AnnotationKind::RequestContext)?;

        let type_id = context_type(property);
        let value = if type_id == TypeId::of::<Method>() {
            Some(PropertyValue::object(request.method().clone()))
        } else if type_id == TypeId::of::<Uri>() {
            Some(PropertyValue::object(request.uri().clone()))
        } else if type_id == TypeId::of::<Version>() {
            Some(PropertyValue::object(request.version()))
        } else if type_id == TypeId::of::<HeaderMap>() {
            Some(PropertyValue::object(request.headers().clone()))
        } else if type_id == TypeId::of::<Session>() {
            request.session().cloned().map(PropertyValue::object)
        } else if type_id == TypeId::of::<Locale>() {
            Some(PropertyValue::object(request.locale()))
        } else {
            return Err(ResolveError::UnsupportedType {
                type_name: property.get_type().name(),
            });
        };
        Ok(value)
    }
}
