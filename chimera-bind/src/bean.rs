//! 请求 Bean
//!
//! 请求 Bean 是可以被默认构造、可以自省属性、可以按属性路径写入值的类型。
//! 通常通过派生宏实现：
//!
//! ```ignore
//! use chimera_bind::prelude::*;
//!
//! #[derive(Default, RequestBean)]
//! #[request_bean]
//! struct SearchRequest {
//!     #[request_parameter("q")]
//!     query: String,
//!
//!     #[header_parameter("x-tenant")]
//!     tenant: Option<String>,
//!
//!     #[bean_parameter]
//!     paging: Paging,
//! }
//! ```
//!
//! 标注了 `#[request_bean]` 的类型会通过 inventory 注册，启动时按模块路径扫描并预热解析计划。

use crate::error::{IntrospectionError, PropertyAccessError};
use crate::property::PropertyDescriptor;
use crate::types::{Reflect, TypeInfo};
use crate::value::PropertyValue;

/// 按属性路径写入值
pub trait PropertyAccessor {
    /// 写入一个属性值，`path` 为点分隔的属性路径（例如 `paging.page`）
    fn set_property_value(&mut self, path: &str, value: PropertyValue) -> Result<(), PropertyAccessError>;
}

/// 请求 Bean
pub trait RequestBean: Reflect + PropertyAccessor + Default + Send + 'static {
    /// 枚举属性
    fn property_descriptors() -> Result<Vec<PropertyDescriptor>, IntrospectionError>;
}

/// `#[request_bean]` 类型的注册信息 - 用于 inventory 收集
pub struct RequestBeanRegistration {
    /// 完整类型名
    pub type_name: &'static str,
    /// 声明该类型的模块路径
    pub module_path: &'static str,
    pub type_info: fn() -> TypeInfo,
}

impl<T: PropertyAccessor + ?Sized> PropertyAccessor for Box<T> {
    fn set_property_value(&mut self, path: &str, value: PropertyValue) -> Result<(), PropertyAccessError> {
        (**self).set_property_value(path, value)
    }
}

inventory::collect!(RequestBeanRegistration);

impl RequestBeanRegistration {
    /// 模块路径是否位于 `package` 之下（包括 `package` 本身）
    pub fn is_in_package(&self, package: &str) -> bool {
        let package = package.trim().trim_end_matches("::");
        if package.is_empty() {
            return false;
        }
        self.module_path == package
            || self
                .module_path
                .strip_prefix(package)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

/// 所有已注册的请求 Bean
pub fn registered_request_beans() -> impl Iterator<Item = &'static RequestBeanRegistration> {
    inventory::iter::<RequestBeanRegistration>.into_iter()
}

/// 位于指定模块路径下的请求 Bean
pub fn request_beans_in_package(package: &str) -> Vec<&'static RequestBeanRegistration> {
    registered_request_beans()
        .filter(|registration| registration.is_in_package(package))
        .collect()
}
