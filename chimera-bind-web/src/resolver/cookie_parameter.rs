//! Cookie 解析器

use std::any::TypeId;

use async_trait::async_trait;
use chimera_bind::{AnnotationKind, BindingProperty, PropertyValue, RequestPropertyResolverBase};

use super::{required_name, supports_named, RequestPropertyResolver};
use crate::cookie::HttpCookie;
use crate::error::ResolveError;
use crate::request::WebRequest;

/// `#[cookie_parameter("name")]`：属性类型为 `HttpCookie` 时返回 Cookie 本身，否则返回 Cookie 的值
pub struct CookieParameterRequestPropertyResolver;

impl RequestPropertyResolverBase for CookieParameterRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_named(property, AnnotationKind::CookieParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for CookieParameterRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        let name = required_name(property, AnnotationKind::CookieParameter)?;
        let Some(cookie) = request.cookie(name) else {
            return Ok(None);
        };

        if property.get_type().unwrap_optional().type_id() == TypeId::of::<HttpCookie>() {
            return Ok(Some(PropertyValue::object(cookie.clone())));
        }
        Ok(Some(PropertyValue::text(cookie.value())))
    }
}
