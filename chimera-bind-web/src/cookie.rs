//! 请求 Cookie

use axum::http::{header::COOKIE, HeaderMap};
use chimera_bind::{ConversionError, FromPropertyValue, PropertyValue, Reflect, TypeInfo};

/// 请求中的一个 Cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCookie {
    name: String,
    value: String,
}

impl HttpCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 解析所有 `Cookie` 请求头，保持出现顺序
    pub fn parse_all(headers: &HeaderMap) -> Vec<HttpCookie> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|cookie| {
                let (name, value) = cookie.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(HttpCookie::new(name, value.trim().trim_matches('"')))
            })
            .collect()
    }
}

impl Reflect for HttpCookie {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<HttpCookie>()
    }
}

impl FromPropertyValue for HttpCookie {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        value.downcast()
    }
}
