// chimera-bind: 注解驱动的请求 Bean 绑定
//
// 把 HTTP 请求中分散的数据（查询参数、表单、路径变量、Cookie、请求头、
// Session、请求体）绑定到一个带注解的结构体上：
// - 自省：枚举属性，为每个属性选择解析器，生成解析计划
// - 缓存：每个类型的解析计划最多构建一次
// - 预热：启动时扫描 `#[request_bean]` 类型
// - 转换与写入：`FromPropertyValue` + `PropertyAccessor`

// 让派生宏生成的 `::chimera_bind::...` 路径在本 crate 内也能解析
extern crate self as chimera_bind;

pub mod annotation;
pub mod bean;
pub mod config;
pub mod constants;
pub mod error;
pub mod introspect;
pub mod logging;
pub mod property;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod value;

pub use annotation::{Annotation, AnnotationKind, Annotations};
pub use bean::{
    registered_request_beans, request_beans_in_package, PropertyAccessor, RequestBean,
    RequestBeanRegistration,
};
pub use config::{
    ConfigError, ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource,
    PropertySource, TomlPropertySource,
};
pub use constants::*;
pub use error::{BodyDecodeError, ConversionError, IntrospectionError, PropertyAccessError};
pub use introspect::{
    AnnotatedRequestBeanIntrospector, CachedAnnotatedRequestBeanIntrospector,
    ClassPathScanningAnnotatedRequestBeanIntrospector, DefaultAnnotatedRequestBeanIntrospector,
    ResolutionPlan, ResolvedPropertyData,
};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use property::{Accessor, AccessorKind, BindingProperty, MethodParameter, PropertyDescriptor};
pub use registry::PropertyResolverRegistry;
pub use resolver::RequestPropertyResolverBase;
pub use types::{BodyDecoder, BodyFormat, PropertiesFn, Reflect, TypeInfo, TypeKind};
pub use value::{deserialize_value, FromPropertyValue, PropertyValue, PropertyValues};

// 派生宏与宏依赖的 inventory
pub use chimera_bind_macros::RequestBean;
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::annotation::{Annotation, AnnotationKind};
    pub use crate::bean::{PropertyAccessor, RequestBean};
    pub use crate::config::Environment;
    pub use crate::error::{ConversionError, IntrospectionError, PropertyAccessError};
    pub use crate::introspect::AnnotatedRequestBeanIntrospector;
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::property::BindingProperty;
    pub use crate::registry::PropertyResolverRegistry;
    pub use crate::resolver::RequestPropertyResolverBase;
    pub use crate::types::{Reflect, TypeInfo};
    pub use crate::value::{FromPropertyValue, PropertyValue};
    pub use chimera_bind_macros::RequestBean;
}
