//! 查询参数解析器

use async_trait::async_trait;
use chimera_bind::{AnnotationKind, BindingProperty, PropertyValue, RequestPropertyResolverBase};

use super::{map_value, required_name, supports_named, supports_unnamed_map, RequestPropertyResolver};
use crate::error::ResolveError;
use crate::request::WebRequest;

/// `#[request_parameter("name")]`：指定名称的所有查询参数值
pub struct RequestParameterRequestPropertyResolver;

impl RequestPropertyResolverBase for RequestParameterRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_named(property, AnnotationKind::RequestParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for RequestParameterRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        let name = required_name(property, AnnotationKind::RequestParameter)?;
        let values = request.query_params()?.get(name).cloned();
        Ok(values.map(PropertyValue::List))
    }
}

/// `#[request_parameter]` 标注在 Map 类型上：全部查询参数
pub struct RequestParameterMapRequestPropertyResolver;

impl RequestPropertyResolverBase for RequestParameterMapRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_unnamed_map(property, AnnotationKind::RequestParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for RequestParameterMapRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        required_name(property, AnnotationKind::RequestParameter)?;
        let values = request.query_params()?.clone();
        Ok(Some(map_value(property, values)))
    }
}
