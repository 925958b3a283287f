//! 绑定相关的错误类型
//!
//! - `IntrospectionError`: 构建解析计划失败（配置错误，不会自动恢复）
//! - `ConversionError`: 请求值无法转换为属性类型
//! - `PropertyAccessError`: 向目标对象写入属性失败
//! - `BodyDecodeError`: 请求体无法反序列化

use thiserror::Error;

/// 请求 Bean 自省错误
#[derive(Error, Debug)]
pub enum IntrospectionError {
    /// 无法枚举类型的属性
    #[error("Unable to introspect request bean of type {type_name}: {message}")]
    RequestBeanIntrospection {
        type_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// 嵌套的 BeanParameter 形成了环
    #[error(
        "Aborting finding resolvers. Circular reference found. Circular references not supported as they can cause stack overflow errors. Cycle: [{}]",
        .cycle.join(", ")
    )]
    CircularReference { cycle: Vec<String> },

    /// 属性状态非法（例如既没有 getter 也没有 setter）
    #[error("{0}")]
    IllegalState(String),
}

impl IntrospectionError {
    /// 包装为带类型名称的自省错误
    pub fn introspection(
        type_name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        IntrospectionError::RequestBeanIntrospection {
            type_name: type_name.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// 不带底层原因的自省错误
    pub fn message(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        IntrospectionError::RequestBeanIntrospection {
            type_name: type_name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// 是否为循环引用错误
    pub fn is_circular_reference(&self) -> bool {
        matches!(self, IntrospectionError::CircularReference { .. })
    }
}

/// 类型转换错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Failed to convert property value of type '{found}' to required type '{required}'")]
    Unsupported {
        found: &'static str,
        required: &'static str,
    },

    #[error("Failed to convert property value of type '{found}' to required type '{required}': {reason}")]
    Parse {
        found: &'static str,
        required: &'static str,
        reason: String,
    },
}

/// 属性写入错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyAccessError {
    /// 属性不存在或不可写
    #[error("Invalid property '{property}': property is not writable or has no setter")]
    NotWritable { property: String },

    /// 值无法转换为属性类型
    #[error("Failed to bind property '{property}': {source}")]
    TypeMismatch {
        property: String,
        #[source]
        source: ConversionError,
    },
}

impl PropertyAccessError {
    pub fn not_writable(property: impl Into<String>) -> Self {
        PropertyAccessError::NotWritable {
            property: property.into(),
        }
    }

    pub fn type_mismatch(property: impl Into<String>, source: ConversionError) -> Self {
        PropertyAccessError::TypeMismatch {
            property: property.into(),
            source,
        }
    }

    /// 出错的属性路径
    pub fn property(&self) -> &str {
        match self {
            PropertyAccessError::NotWritable { property } => property,
            PropertyAccessError::TypeMismatch { property, .. } => property,
        }
    }

    /// 给属性路径加上父属性前缀，用于嵌套 Bean
    pub fn nested(self, parent: &str) -> Self {
        match self {
            PropertyAccessError::NotWritable { property } => PropertyAccessError::NotWritable {
                property: format!("{}.{}", parent, property),
            },
            PropertyAccessError::TypeMismatch { property, source } => {
                PropertyAccessError::TypeMismatch {
                    property: format!("{}.{}", parent, property),
                    source,
                }
            }
        }
    }
}

/// 请求体反序列化错误
#[derive(Error, Debug)]
pub enum BodyDecodeError {
    #[error("Type '{0}' cannot be read from a request body")]
    Unreadable(&'static str),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Form parse error: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_reference_message() {
        let err = IntrospectionError::CircularReference {
            cycle: vec!["app::Outer".to_string(), "app::Inner".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Aborting finding resolvers. Circular reference found. Circular references not supported as they can cause stack overflow errors. Cycle: [app::Outer, app::Inner]"
        );
        assert!(err.is_circular_reference());
    }

    #[test]
    fn test_nested_property_path() {
        let err = PropertyAccessError::not_writable("value").nested("child");
        assert_eq!(err.property(), "child.value");
    }
}
