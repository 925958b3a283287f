//! 路径变量解析器

use async_trait::async_trait;
use chimera_bind::{AnnotationKind, BindingProperty, PropertyValue, RequestPropertyResolverBase};

use super::{require_annotation, required_name, supports_named, supports_unnamed_map, RequestPropertyResolver};
use crate::error::ResolveError;
use crate::request::WebRequest;

/// `#[path_parameter("name")]`：匹配的路径变量
pub struct PathParameterRequestPropertyResolver;

impl RequestPropertyResolverBase for PathParameterRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_named(property, AnnotationKind::PathParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for PathParameterRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        let name = required_name(property, AnnotationKind::PathParameter)?;
        Ok(request.path_param(name)?.map(PropertyValue::text))
    }
}

/// `#[path_parameter]` 标注在 Map 类型上：全部路径变量
pub struct PathParameterMapRequestPropertyResolver;

impl RequestPropertyResolverBase for PathParameterMapRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_unnamed_map(property, AnnotationKind::PathParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for PathParameterMapRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        require_annotation(property, AnnotationKind::PathParameter)?;
        let variables = request.path_params()?.iter().cloned().collect();
        Ok(Some(PropertyValue::Map(variables)))
    }
}
