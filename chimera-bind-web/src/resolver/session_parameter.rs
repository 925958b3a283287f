//! Session 属性解析器

use async_trait::async_trait;
use chimera_bind::{AnnotationKind, BindingProperty, PropertyValue, RequestPropertyResolverBase};

use super::{required_name, supports_named, RequestPropertyResolver};
use crate::error::ResolveError;
use crate::request::WebRequest;

/// `#[session_parameter("name")]`：Session 属性，没有 Session 或属性时无值
///
/// 属性以 JSON 保存，写入时按字段类型反序列化
pub struct SessionParameterRequestPropertyResolver;

impl RequestPropertyResolverBase for SessionParameterRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_named(property, AnnotationKind::SessionParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for SessionParameterRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        let name = required_name(property, AnnotationKind::SessionParameter)?;
        Ok(request
            .session()
            .and_then(|session| session.get_attribute(name))
            .map(PropertyValue::Json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::tests::web_request;
    use crate::resolver::tests::property;
    use crate::session::Session;
    use axum::body::Body;
    use chimera_bind::Annotation;

    #[tokio::test]
    async fn test_session_attribute() {
        let resolver = SessionParameterRequestPropertyResolver;
        let prop = property::<Option<String>>("user", Annotation::named(AnnotationKind::SessionParameter, "user"));
        assert!(resolver.supports(&prop));

        let session = Session::new();
        session.set_attribute("user", serde_json::json!("alice"));
        let mut req = axum::http::Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut().insert(session);
        let req = web_request(req).await;

        let value = resolver.resolve(&prop, &req).await.unwrap().unwrap();
        assert_eq!(value.convert::<Option<String>>().unwrap().as_deref(), Some("alice"));

        let missing = property::<String>("x", Annotation::named(AnnotationKind::SessionParameter, "x"));
        assert!(resolver.resolve(&missing, &req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_session() {
        let resolver = SessionParameterRequestPropertyResolver;
        let prop = property::<String>("user", Annotation::named(AnnotationKind::SessionParameter, "user"));
        let req = web_request(axum::http::Request::builder().body(Body::empty()).unwrap()).await;
        assert!(resolver.resolve(&prop, &req).await.unwrap().is_none());
    }
}
