//! 请求体解析器

use async_trait::async_trait;
use chimera_bind::{AnnotationKind, BindingProperty, BodyFormat, PropertyValue, RequestPropertyResolverBase};

use super::{require_annotation, RequestPropertyResolver};
use crate::error::ResolveError;
use crate::request::WebRequest;

/// `#[request_body]`：按 Content-Type 反序列化整个请求体
///
/// 缺少 Content-Type 时按 JSON 处理；请求体为空时无值
pub struct RequestBodyRequestPropertyResolver;

impl RequestPropertyResolverBase for RequestBodyRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        property.has_annotation(AnnotationKind::RequestBody)
    }
}

fn body_format(content_type: Option<&str>) -> Result<BodyFormat, ResolveError> {
    match content_type {
        None => Ok(BodyFormat::Json),
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            if ct == "application/json" || ct.ends_with("+json") {
                Ok(BodyFormat::Json)
            } else if ct == "application/x-www-form-urlencoded" {
                Ok(BodyFormat::UrlEncoded)
            } else {
                Err(ResolveError::UnsupportedMediaType(ct))
            }
        }
    }
}

#[async_trait]
impl RequestPropertyResolver for RequestBodyRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        require_annotation(property, AnnotationKind::RequestBody)?;

        if request.body().is_empty() {
            return Ok(None);
        }

        let format = body_format(request.content_type())?;
        property
            .get_method_parameter()
            .read_body(format, request.body())
            .map_err(|e| {
                tracing::debug!(error = %e, property = property.name(), "Request body parse error");
                ResolveError::Body(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::tests::web_request;
    use axum::body::Body;
    use chimera_bind::{Annotation, BodyDecodeError, PropertyDescriptor, TypeInfo};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    fn body_property() -> BindingProperty {
        let descriptor = PropertyDescriptor::field(
            "payload",
            TypeInfo::opaque::<crate::resolver::tests::Owner>(),
            TypeInfo::deserializable::<Payload>(),
        )
        .with_field_annotation(Annotation::new(AnnotationKind::RequestBody));
        BindingProperty::for_property_descriptor(&descriptor).unwrap()
    }

    async fn request(content_type: Option<&str>, body: &'static str) -> WebRequest {
        let mut builder = axum::http::Request::builder().method("POST");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        web_request(builder.body(Body::from(body)).unwrap()).await
    }

    #[tokio::test]
    async fn test_json_body() {
        let resolver = RequestBodyRequestPropertyResolver;
        let prop = body_property();
        assert!(resolver.supports(&prop));

        let req = request(Some("application/json; charset=utf-8"), r#"{"name":"a","count":2}"#).await;
        let value = resolver.resolve(&prop, &req).await.unwrap().unwrap();
        assert_eq!(
            value.downcast::<Payload>().unwrap(),
            Payload { name: "a".to_string(), count: 2 }
        );

        let req = request(None, r#"{"name":"b","count":3}"#).await;
        assert!(resolver.resolve(&prop, &req).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_urlencoded_body() {
        let resolver = RequestBodyRequestPropertyResolver;
        let req = request(Some("application/x-www-form-urlencoded"), "name=c&count=4").await;
        let value = resolver.resolve(&body_property(), &req).await.unwrap().unwrap();
        assert_eq!(value.downcast::<Payload>().unwrap().count, 4);
    }

    #[tokio::test]
    async fn test_body_errors() {
        let resolver = RequestBodyRequestPropertyResolver;

        let req = request(Some("application/json"), "").await;
        assert!(resolver.resolve(&body_property(), &req).await.unwrap().is_none());

        let req = request(Some("text/plain"), "hello").await;
        let err = resolver.resolve(&body_property(), &req).await.unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedMediaType(ref ct) if ct == "text/plain"));

        let req = request(Some("application/json"), "{not json").await;
        let err = resolver.resolve(&body_property(), &req).await.unwrap_err();
        assert!(matches!(err, ResolveError::Body(BodyDecodeError::Json(_))));
    }
}
