//! 请求 Bean 提取器
//!
//! - `BeanParameter<T>`: 绑定请求 Bean，类型转换失败时拒绝请求
//! - `ValidBeanParameter<T>`: 绑定并校验，任何字段错误都拒绝请求
//! - `BoundBeanParameter<T>`: 绑定并校验，错误保留在 `BindingResult` 中交给处理函数
//!
//! ```ignore
//! async fn search(ValidBeanParameter(req): ValidBeanParameter<SearchRequest>) -> impl IntoResponse {
//!     Json(req.query)
//! }
//! ```
//!
//! 三者共用同一个绑定流程：取解析计划，逐个调用解析器暂存属性值，最后由 `DataBinder` 写入。
//! 解析器失败（请求格式错误等）总是拒绝请求，错误消息包含属性路径。

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use chimera_bind::{PropertyValues, RequestBean, TypeInfo, DEFAULT_OBJECT_NAME};
use validator::Validate;

use crate::binder::{BindingResult, DataBinder};
use crate::config::BinderContext;
use crate::error::{BindRejection, BinderError};
use crate::request::WebRequest;

/// 绑定请求 Bean，类型转换失败时返回 400
#[derive(Debug, Clone, Default)]
pub struct BeanParameter<T>(pub T);

/// 绑定并校验请求 Bean
#[derive(Debug, Clone, Default)]
pub struct ValidBeanParameter<T>(pub T);

/// 绑定并校验请求 Bean，错误不拒绝请求
#[derive(Debug, Clone)]
pub struct BoundBeanParameter<T> {
    pub value: T,
    pub binding_result: BindingResult,
}

impl<T> BeanParameter<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> ValidBeanParameter<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> BoundBeanParameter<T> {
    pub fn has_errors(&self) -> bool {
        self.binding_result.has_errors()
    }

    pub fn into_parts(self) -> (T, BindingResult) {
        (self.value, self.binding_result)
    }
}

impl<T> Deref for BeanParameter<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for BeanParameter<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> Deref for ValidBeanParameter<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> Deref for BoundBeanParameter<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for BeanParameter<T>
where
    T: RequestBean,
    S: Send + Sync,
{
    type Rejection = BindRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let binder = bind_request::<T>(req)
            .await
            .map_err(|e| BindRejection::new(e, path.as_str()))?;

        let (value, result) = binder.into_parts();
        if result.has_errors() {
            return Err(BindRejection::new(BinderError::Bind(result), path));
        }
        Ok(BeanParameter(value))
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for ValidBeanParameter<T>
where
    T: RequestBean + Validate,
    S: Send + Sync,
{
    type Rejection = BindRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let mut binder = bind_request::<T>(req)
            .await
            .map_err(|e| BindRejection::new(e, path.as_str()))?;
        binder.validate();

        let (value, result) = binder.into_parts();
        if result.has_errors() {
            return Err(BindRejection::new(BinderError::Bind(result), path));
        }
        Ok(ValidBeanParameter(value))
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for BoundBeanParameter<T>
where
    T: RequestBean + Validate,
    S: Send + Sync,
{
    type Rejection = BindRejection;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let mut binder = bind_request::<T>(req)
            .await
            .map_err(|e| BindRejection::new(e, path.as_str()))?;
        binder.validate();

        let (value, binding_result) = binder.into_parts();
        Ok(BoundBeanParameter { value, binding_result })
    }
}

/// 绑定流程：解析计划 -> 解析器取值 -> 写入默认构造的目标对象
pub async fn bind_request<T: RequestBean>(req: Request) -> Result<DataBinder<T>, BinderError> {
    let context = req
        .extensions()
        .get::<Arc<BinderContext>>()
        .cloned()
        .unwrap_or_else(BinderContext::global);

    let request = WebRequest::from_request(req, Arc::clone(context.properties())).await?;
    let values = resolve_property_values(&context, &T::type_info(), &request).await?;

    let mut binder = DataBinder::new(T::default(), object_name(T::type_info().name()));
    binder.bind(values);
    Ok(binder)
}

/// 按解析计划逐个调用解析器，返回 `None` 的属性不写入
pub async fn resolve_property_values(
    context: &BinderContext,
    target: &TypeInfo,
    request: &WebRequest,
) -> Result<PropertyValues, BinderError> {
    let plan = context.resolution_plan(target)?;

    let mut values = PropertyValues::new();
    for entry in plan.iter() {
        let resolved = entry
            .resolver()
            .resolve(entry.binding_property(), request)
            .await
            .map_err(|source| BinderError::PropertyBinding {
                property: entry.property_name().to_string(),
                source,
            })?;

        match resolved {
            Some(value) => {
                tracing::trace!(property = entry.property_name(), value = ?value, "Property resolved");
                values.add(entry.property_name(), value);
            }
            None => tracing::trace!(property = entry.property_name(), "No value in request"),
        }
    }
    Ok(values)
}

/// 绑定结果使用的对象名：类型名首字母小写，例如 `SearchRequest` -> `searchRequest`
fn object_name(type_name: &str) -> String {
    let simple = type_name
        .split('<')
        .next()
        .unwrap_or(type_name)
        .rsplit("::")
        .next()
        .unwrap_or("")
        .trim();

    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => DEFAULT_OBJECT_NAME.to_string(),
    }
}
