//! 请求视图
//!
//! 解析器共享的只读请求视图。请求体在构建时一次性缓冲（受 `max-body-size` 限制），
//! 查询参数、Cookie、urlencoded 表单和 multipart 数据都在首次访问时解析并缓存。

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::RawPathParamsRejection, FromRequestParts, RawPathParams, Request},
    http::{
        header::{ACCEPT_LANGUAGE, CONTENT_TYPE},
        request::Parts,
        HeaderMap, Method, Uri, Version,
    },
};
use bytes::Bytes;

use crate::cookie::HttpCookie;
use crate::error::{BinderError, ResolveError};
use crate::locale::Locale;
use crate::multipart::MultipartData;
use crate::properties::BinderProperties;
use crate::session::Session;

/// 多值 Map，值按出现顺序排列
pub type MultiValueMap = HashMap<String, Vec<String>>;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// 绑定使用的请求视图
#[derive(Debug)]
pub struct WebRequest {
    parts: Parts,
    path_params: Vec<(String, String)>,
    /// 路径变量无法解码时的错误，由路径变量解析器报告
    path_error: Option<String>,
    body: Bytes,
    properties: Arc<BinderProperties>,
    query: once_cell::sync::OnceCell<MultiValueMap>,
    cookies: once_cell::sync::OnceCell<Vec<HttpCookie>>,
    form: tokio::sync::OnceCell<MultiValueMap>,
    multipart: tokio::sync::OnceCell<Option<MultipartData>>,
}

impl WebRequest {
    pub fn new(parts: Parts, body: Bytes, properties: Arc<BinderProperties>) -> Self {
        Self {
            parts,
            path_params: Vec::new(),
            path_error: None,
            body,
            properties,
            query: once_cell::sync::OnceCell::new(),
            cookies: once_cell::sync::OnceCell::new(),
            form: tokio::sync::OnceCell::new(),
            multipart: tokio::sync::OnceCell::new(),
        }
    }

    /// 从 axum 请求构建：提取路径变量并缓冲请求体
    pub async fn from_request(req: Request, properties: Arc<BinderProperties>) -> Result<Self, BinderError> {
        let (mut parts, body) = req.into_parts();

        // 不经过路由（没有匹配的路径变量）时视为空
        let mut path_error = None;
        let path_params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(params) => params
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            Err(RawPathParamsRejection::MissingPathParams(e)) => {
                tracing::trace!(error = %e, "No path parameters available");
                Vec::new()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Invalid path parameters");
                path_error = Some(e.to_string());
                Vec::new()
            }
        };

        let body = axum::body::to_bytes(body, properties.max_body_size)
            .await
            .map_err(|e| {
                let error_msg = e.to_string();
                tracing::debug!(error = %error_msg, "Failed to buffer request body");
                BinderError::Body(error_msg)
            })?;

        let mut request = Self::new(parts, body, properties).with_path_params(path_params);
        request.path_error = path_error;
        Ok(request)
    }

    pub fn with_path_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.path_params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn version(&self) -> Version {
        self.parts.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn properties(&self) -> &BinderProperties {
        &self.properties
    }

    /// 请求的 Content-Type（不含参数）
    pub fn content_type(&self) -> Option<&str> {
        self.headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim())
            .filter(|v| !v.is_empty())
    }

    fn has_content_type(&self, expected: &str) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.eq_ignore_ascii_case(expected))
    }

    /// 缓冲的请求体
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// 查询参数
    pub fn query_params(&self) -> Result<&MultiValueMap, ResolveError> {
        self.query.get_or_try_init(|| {
            let query = self.uri().query().unwrap_or("");
            parse_urlencoded(query.as_bytes()).map_err(ResolveError::Query)
        })
    }

    /// 路径变量，按路由模板中的顺序
    pub fn path_params(&self) -> Result<&[(String, String)], ResolveError> {
        match &self.path_error {
            Some(e) => Err(ResolveError::PathVariable(e.clone())),
            None => Ok(&self.path_params),
        }
    }

    pub fn path_param(&self, name: &str) -> Result<Option<&str>, ResolveError> {
        Ok(self
            .path_params()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str()))
    }

    pub fn cookies(&self) -> &[HttpCookie] {
        self.cookies.get_or_init(|| HttpCookie::parse_all(self.headers()))
    }

    pub fn cookie(&self, name: &str) -> Option<&HttpCookie> {
        self.cookies().iter().find(|c| c.name() == name)
    }

    /// urlencoded 表单数据，其他 Content-Type 为空
    pub async fn form_data(&self) -> Result<&MultiValueMap, ResolveError> {
        self.form
            .get_or_try_init(|| async {
                if !self.has_content_type(FORM_URLENCODED) {
                    return Ok(MultiValueMap::new());
                }
                parse_urlencoded(&self.body).map_err(ResolveError::Form)
            })
            .await
    }

    /// multipart 数据，非 multipart 请求为 `None`
    pub async fn multipart_data(&self) -> Result<Option<&MultipartData>, ResolveError> {
        let data = self
            .multipart
            .get_or_try_init(|| async {
                if !self.has_content_type(MULTIPART_FORM_DATA) {
                    return Ok(None);
                }
                let content_type = self
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                MultipartData::parse(
                    self.body.clone(),
                    content_type,
                    self.properties.to_multer_constraints(),
                )
                .await
                .map(Some)
                .map_err(|e| {
                    tracing::debug!(error = %e, "Multipart parse error");
                    ResolveError::Multipart(e)
                })
            })
            .await?;
        Ok(data.as_ref())
    }

    /// 应用中间件放入请求扩展的 Session
    pub fn session(&self) -> Option<&Session> {
        self.parts.extensions.get::<Session>()
    }

    /// `Accept-Language` 中权重最高的 Locale，没有时使用默认 Locale
    pub fn locale(&self) -> Locale {
        self.headers()
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Locale::from_accept_language)
            .or_else(|| self.properties.default_locale.parse().ok())
            .unwrap_or_else(|| Locale::new(chimera_bind::DEFAULT_LOCALE, None))
    }
}

fn parse_urlencoded(input: &[u8]) -> Result<MultiValueMap, serde_urlencoded::de::Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)?;
    let mut map = MultiValueMap::new();
    for (key, value) in pairs {
        map.entry(key).or_default().push(value);
    }
    Ok(map)
}
