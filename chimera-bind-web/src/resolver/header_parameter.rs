//! 请求头解析器

use async_trait::async_trait;
use chimera_bind::{AnnotationKind, BindingProperty, PropertyValue, RequestPropertyResolverBase};

use super::{
    map_value, require_annotation, required_name, supports_named, supports_unnamed_map,
    RequestPropertyResolver,
};
use crate::error::ResolveError;
use crate::request::{MultiValueMap, WebRequest};

/// `#[header_parameter("name")]`：指定请求头的所有值
pub struct HeaderParameterRequestPropertyResolver;

impl RequestPropertyResolverBase for HeaderParameterRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_named(property, AnnotationKind::HeaderParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for HeaderParameterRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        let name = required_name(property, AnnotationKind::HeaderParameter)?;
        let values: Vec<String> = request
            .headers()
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(PropertyValue::List(values)))
    }
}

/// `#[header_parameter]` 标注在 Map 类型上：全部请求头（名称为小写）
pub struct HeaderParameterMapRequestPropertyResolver;

impl RequestPropertyResolverBase for HeaderParameterMapRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_unnamed_map(property, AnnotationKind::HeaderParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for HeaderParameterMapRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        require_annotation(property, AnnotationKind::HeaderParameter)?;

        let mut headers = MultiValueMap::new();
        for (name, value) in request.headers() {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_string())
                    .or_default()
                    .push(value.to_string());
            }
        }
        Ok(Some(map_value(property, headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::tests::web_request;
    use crate::resolver::tests::property;
    use axum::body::Body;
    use chimera_bind::Annotation;
    use std::collections::HashMap;

    async fn request() -> WebRequest {
        let req = axum::http::Request::builder()
            .header("x-tag", "a")
            .header("x-tag", "b, c")
            .header("X-Trace-Id", "t-1")
            .body(Body::empty())
            .unwrap();
        web_request(req).await
    }

    #[tokio::test]
    async fn test_resolve_header_values() {
        let resolver = HeaderParameterRequestPropertyResolver;
        let req = request().await;

        let tags = property::<Vec<String>>("tags", Annotation::named(AnnotationKind::HeaderParameter, "x-tag"));
        let value = resolver.resolve(&tags, &req).await.unwrap().unwrap();
        assert_eq!(value.convert::<Vec<String>>().unwrap(), vec!["a", "b, c"]);

        let trace = property::<String>("trace", Annotation::named(AnnotationKind::HeaderParameter, "x-trace-id"));
        let value = resolver.resolve(&trace, &req).await.unwrap().unwrap();
        assert_eq!(value.convert::<String>().unwrap(), "t-1");

        let missing = property::<String>("m", Annotation::named(AnnotationKind::HeaderParameter, "x-missing"));
        assert!(resolver.resolve(&missing, &req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_header_map() {
        let resolver = HeaderParameterMapRequestPropertyResolver;
        let prop = property::<HashMap<String, String>>("headers", Annotation::new(AnnotationKind::HeaderParameter));
        assert!(resolver.supports(&prop));

        let req = request().await;
        let value = resolver.resolve(&prop, &req).await.unwrap().unwrap();
        let headers = value.convert::<HashMap<String, String>>().unwrap();
        assert_eq!(headers.get("x-tag").map(String::as_str), Some("a"));
        assert_eq!(headers.get("x-trace-id").map(String::as_str), Some("t-1"));
    }
}
