//! Web 绑定错误
//!
//! - `ResolveError`: 单个解析器从请求中取值失败
//! - `BinderError`: 整个绑定流程失败，可以直接作为响应返回
//! - `BindRejection`: 提取器的拒绝类型，携带请求路径

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chimera_bind::{BodyDecodeError, IntrospectionError};
use serde_json::Value;
use thiserror::Error;

use crate::binder::BindingResult;

/// 解析器错误
#[derive(Error, Debug)]
pub enum ResolveError {
    /// 解析器被用于没有对应注解的属性
    #[error("No {annotation} annotation found on property '{property}'")]
    MissingAnnotation {
        annotation: &'static str,
        property: String,
    },

    /// 解析器不支持该属性类型
    #[error("Unable to resolve type {type_name}")]
    UnsupportedType { type_name: &'static str },

    /// 查询字符串无法解析
    #[error("Invalid query string: {0}")]
    Query(#[source] serde_urlencoded::de::Error),

    /// 路径变量无法解码
    #[error("Invalid path variable: {0}")]
    PathVariable(String),

    /// urlencoded 表单无法解析
    #[error("Invalid form data: {0}")]
    Form(#[source] serde_urlencoded::de::Error),

    /// multipart 数据无法解析
    #[error("Failed to read multipart data: {0}")]
    Multipart(#[from] multer::Error),

    /// 请求体无法反序列化
    #[error("{0}")]
    Body(#[from] BodyDecodeError),

    #[error("Content type '{0}' not supported")]
    UnsupportedMediaType(String),

    /// 自定义解析器的其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResolveError {
    pub fn missing_annotation(annotation: &'static str, property: impl Into<String>) -> Self {
        ResolveError::MissingAnnotation {
            annotation,
            property: property.into(),
        }
    }

    /// 获取错误对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResolveError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ResolveError::MissingAnnotation { .. }
            | ResolveError::UnsupportedType { .. }
            | ResolveError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// 绑定流程错误
#[derive(Error, Debug)]
pub enum BinderError {
    /// 解析计划构建失败 - 500 Internal Server Error
    #[error("{0}")]
    Introspection(#[from] IntrospectionError),

    /// 某个属性的值无法解析 - 通常为 400 Bad Request
    #[error("Unable to resolve property. {source}")]
    PropertyBinding {
        property: String,
        #[source]
        source: ResolveError,
    },

    /// 绑定或校验失败 - 400 Bad Request
    #[error(
        "Validation failed for object '{}'. Error count: {}",
        .0.object_name(),
        .0.error_count()
    )]
    Bind(BindingResult),

    /// 请求体读取失败 - 400 Bad Request
    #[error("Failed to read request body: {0}")]
    Body(String),
}

impl BinderError {
    /// 获取错误对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            BinderError::Introspection(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BinderError::PropertyBinding { source, .. } => source.status_code(),
            BinderError::Bind(_) => StatusCode::BAD_REQUEST,
            BinderError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// 获取错误详情（用于 JSON 响应）
    pub fn details(&self) -> Option<Value> {
        match self {
            BinderError::PropertyBinding { property, .. } => {
                Some(serde_json::json!({ "property": property }))
            }
            BinderError::Bind(result) => Some(result.to_details()),
            _ => None,
        }
    }

    /// 绑定失败时的绑定结果
    pub fn binding_result(&self) -> Option<&BindingResult> {
        match self {
            BinderError::Bind(result) => Some(result),
            _ => None,
        }
    }
}

/// 标准错误响应格式
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: String, message: String, path: String) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error,
            message,
            path,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// 由绑定错误构建
    pub fn from_error(error: &BinderError, path: impl Into<String>) -> Self {
        let status = error.status_code();
        let response = Self::new(
            status,
            status.canonical_reason().unwrap_or("Unknown Error").to_string(),
            error.to_string(),
            path.into(),
        );
        match error.details() {
            Some(details) => response.with_details(details),
            None => response,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// 提取器拒绝类型
#[derive(Debug)]
pub struct BindRejection {
    pub error: BinderError,
    /// 请求路径
    pub path: String,
}

impl BindRejection {
    pub fn new(error: BinderError, path: impl Into<String>) -> Self {
        Self {
            error,
            path: path.into(),
        }
    }

    pub fn into_error(self) -> BinderError {
        self.error
    }
}

impl std::fmt::Display for BindRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for BindRejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl IntoResponse for BindRejection {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.error, path = %self.path, "Request bean binding failed");
        } else {
            tracing::debug!(error = %self.error, path = %self.path, "Request bean binding rejected");
        }
        ErrorResponse::from_error(&self.error, self.path).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::FieldError;

    #[test]
    fn test_property_binding_message() {
        let err = BinderError::PropertyBinding {
            property: "paging.page".to_string(),
            source: ResolveError::UnsupportedMediaType("text/plain".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unable to resolve property. Content type 'text/plain' not supported"
        );
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.details().unwrap()["property"], "paging.page");
    }

    #[test]
    fn test_status_codes() {
        let err = BinderError::Introspection(IntrospectionError::CircularReference {
            cycle: vec!["A".to_string()],
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = BinderError::PropertyBinding {
            property: "name".to_string(),
            source: ResolveError::missing_annotation("RequestParameter", "name"),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(BinderError::Body("too large".to_string()).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_response_for_bind_error() {
        let mut result = BindingResult::new("searchRequest");
        result.add_error(FieldError::new("page", "typeMismatch", "bad number"));
        let err = BinderError::Bind(result);

        let response = ErrorResponse::from_error(&err, "/search");
        assert_eq!(response.status, 400);
        assert_eq!(response.error, "Bad Request");
        assert_eq!(response.path, "/search");
        assert_eq!(
            response.message,
            "Validation failed for object 'searchRequest'. Error count: 1"
        );
        assert_eq!(
            response.details.unwrap()["page"],
            serde_json::json!(["bad number"])
        );
    }
}
