//! # Chimera Bind Web
//!
//! 请求 Bean 绑定的 Axum 集成
//!
//! ## 核心特性
//!
//! - **提取器** - `BeanParameter`、`ValidBeanParameter`、`BoundBeanParameter`
//! - **内置解析器** - 查询参数、表单（含 multipart）、路径变量、Cookie、请求头、Session、请求上下文、请求体
//! - **自定义解析器** - 实现 `RequestPropertyResolver` 并通过 `BinderConfiguration` 注册
//! - **启动预热** - 按模块路径扫描 `#[request_bean]` 类型，自省错误在启动时暴露
//!
//! ```ignore
//! use chimera_bind_web::prelude::*;
//!
//! #[derive(Debug, Default, RequestBean, Validate)]
//! #[request_bean]
//! struct SearchRequest {
//!     #[request_parameter("q")]
//!     #[validate(length(min = 1))]
//!     query: String,
//!
//!     #[path_parameter("tenant")]
//!     tenant: String,
//! }
//!
//! async fn search(ValidBeanParameter(req): ValidBeanParameter<SearchRequest>) -> String {
//!     format!("{}: {}", req.tenant, req.query)
//! }
//!
//! let context = BinderConfiguration::new()
//!     .add_package_to_scan(module_path!())
//!     .build()?;
//!
//! let app = Router::new()
//!     .route("/:tenant/search", get(search))
//!     .layer(Extension(context));
//! ```

pub mod binder;
pub mod config;
pub mod cookie;
pub mod error;
pub mod extractors;
pub mod locale;
pub mod multipart;
pub mod properties;
pub mod request;
pub mod resolver;
pub mod session;

pub use binder::{BindingResult, DataBinder, FieldError, TYPE_MISMATCH_CODE};
pub use config::{BinderConfiguration, BinderContext};
pub use cookie::HttpCookie;
pub use error::{BindRejection, BinderError, ErrorResponse, ResolveError};
pub use extractors::{bind_request, BeanParameter, BoundBeanParameter, ValidBeanParameter};
pub use locale::Locale;
pub use multipart::{MultipartData, MultipartFile, MultipartPart};
pub use properties::BinderProperties;
pub use request::{MultiValueMap, WebRequest};
pub use resolver::{default_property_resolver_registry, RequestPropertyResolver, ResolverRegistry};
pub use session::Session;

pub mod prelude {
    //! 预导入模块

    pub use crate::binder::{BindingResult, FieldError};
    pub use crate::config::{BinderConfiguration, BinderContext};
    pub use crate::cookie::HttpCookie;
    pub use crate::error::{BindRejection, BinderError, ResolveError};
    pub use crate::extractors::*;
    pub use crate::locale::Locale;
    pub use crate::multipart::MultipartFile;
    pub use crate::request::WebRequest;
    pub use crate::resolver::RequestPropertyResolver;
    pub use crate::session::Session;

    pub use chimera_bind::prelude::*;
    pub use validator::Validate;

    pub use async_trait::async_trait;
    pub use axum::routing::{delete, get, patch, post, put};
    pub use axum::{Extension, Router};
}
