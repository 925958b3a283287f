//! 数据绑定
//!
//! `DataBinder` 把解析器暂存的 `PropertyValues` 写入目标对象：
//!
//! - 类型转换失败记录为 `typeMismatch` 字段错误，不会中断请求
//! - 不可写的属性路径被忽略（与未知字段一致）
//! - 校验通过 `validator::Validate` 执行，嵌套错误展开为点分隔路径

use std::collections::BTreeMap;

use chimera_bind::{PropertyAccessError, PropertyAccessor, PropertyValues};
use serde::Serialize;
use serde_json::Value;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// 类型转换失败的错误码
pub const TYPE_MISMATCH_CODE: &str = "typeMismatch";

/// 字段错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// 点分隔的属性路径
    pub field: String,
    /// 错误码（`typeMismatch` 或校验规则名称）
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// 绑定结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindingResult {
    object_name: String,
    errors: Vec<FieldError>,
}

impl BindingResult {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            errors: Vec::new(),
        }
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn add_error(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// 指定字段的第一个错误
    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn has_field_errors(&self, field: &str) -> bool {
        self.field_error(field).is_some()
    }

    /// 字段 -> 错误消息列表，用于错误响应的 details
    pub fn to_details(&self) -> Value {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for error in &self.errors {
            grouped.entry(&error.field).or_default().push(&error.message);
        }
        serde_json::json!(grouped)
    }
}

/// 数据绑定器
pub struct DataBinder<T> {
    target: T,
    binding_result: BindingResult,
}

impl<T: PropertyAccessor> DataBinder<T> {
    pub fn new(target: T, object_name: impl Into<String>) -> Self {
        Self {
            target,
            binding_result: BindingResult::new(object_name),
        }
    }

    /// 按顺序写入所有属性值
    pub fn bind(&mut self, values: PropertyValues) {
        for (path, value) in values {
            match self.target.set_property_value(&path, value) {
                Ok(()) => {}
                Err(PropertyAccessError::NotWritable { property }) => {
                    tracing::warn!(property = %property, "Ignoring value for non-writable property");
                }
                Err(PropertyAccessError::TypeMismatch { property, source }) => {
                    tracing::debug!(property = %property, error = %source, "Property type mismatch");
                    self.binding_result
                        .add_error(FieldError::new(property, TYPE_MISMATCH_CODE, source.to_string()));
                }
            }
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn binding_result(&self) -> &BindingResult {
        &self.binding_result
    }

    pub fn into_parts(self) -> (T, BindingResult) {
        (self.target, self.binding_result)
    }
}

impl<T: PropertyAccessor + Validate> DataBinder<T> {
    /// 校验目标对象，错误追加到绑定结果
    pub fn validate(&mut self) {
        if let Err(errors) = self.target.validate() {
            tracing::debug!(error = ?errors, "Validation error");
            flatten_validation_errors(&errors, "", &mut self.binding_result);
        }
    }
}

fn flatten_validation_errors(errors: &ValidationErrors, prefix: &str, result: &mut BindingResult) {
    // 按字段名排序，保证错误顺序稳定
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in entries {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|cow| cow.to_string())
                        .unwrap_or_else(|| format!("Validation failed for field: {}", path));
                    result.add_error(FieldError::new(path.clone(), error.code.to_string(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                flatten_validation_errors(nested, &path, result);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten_validation_errors(nested, &format!("{}[{}]", path, index), result);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_bind::{ConversionError, PropertyValue};

    #[derive(Debug, Default, Validate)]
    struct Inner {
        #[validate(range(min = 1, message = "must be positive"))]
        page: u32,
    }

    #[derive(Debug, Default, Validate)]
    struct Target {
        #[validate(length(min = 2))]
        name: String,
        #[validate(nested)]
        inner: Inner,
    }

    impl PropertyAccessor for Target {
        fn set_property_value(&mut self, path: &str, value: PropertyValue) -> Result<(), PropertyAccessError> {
            match path {
                "name" => {
                    self.name = value
                        .convert()
                        .map_err(|e: ConversionError| PropertyAccessError::type_mismatch(path, e))?;
                    Ok(())
                }
                "inner.page" => {
                    self.inner.page = value
                        .convert()
                        .map_err(|e: ConversionError| PropertyAccessError::type_mismatch(path, e))?;
                    Ok(())
                }
                _ => Err(PropertyAccessError::not_writable(path)),
            }
        }
    }

    #[test]
    fn test_bind_values() {
        let mut values = PropertyValues::new();
        values.add("name", "chimera".into());
        values.add("inner.page", "3".into());

        let mut binder = DataBinder::new(Target::default(), "target");
        binder.bind(values);
        let (target, result) = binder.into_parts();

        assert!(!result.has_errors());
        assert_eq!(target.name, "chimera");
        assert_eq!(target.inner.page, 3);
    }

    #[test]
    fn test_type_mismatch_and_unknown_property() {
        let mut values = PropertyValues::new();
        values.add("inner.page", "abc".into());
        values.add("unknown", "x".into());

        let mut binder = DataBinder::new(Target::default(), "target");
        binder.bind(values);

        let result = binder.binding_result();
        assert_eq!(result.error_count(), 1);
        let error = result.field_error("inner.page").unwrap();
        assert_eq!(error.code, TYPE_MISMATCH_CODE);
        assert!(!result.has_field_errors("unknown"));
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let mut binder = DataBinder::new(Target::default(), "target");
        binder.validate();

        let result = binder.binding_result();
        assert_eq!(result.error_count(), 2);

        let inner = result.field_error("inner.page").unwrap();
        assert_eq!(inner.code, "range");
        assert_eq!(inner.message, "must be positive");

        let name = result.field_error("name").unwrap();
        assert_eq!(name.code, "length");
        assert_eq!(name.message, "Validation failed for field: name");
    }

    #[test]
    fn test_details_grouped_by_field() {
        let mut result = BindingResult::new("target");
        result.add_error(FieldError::new("a", "x", "first"));
        result.add_error(FieldError::new("a", "y", "second"));
        result.add_error(FieldError::new("b", "x", "third"));

        assert_eq!(
            result.to_details(),
            serde_json::json!({ "a": ["first", "second"], "b": ["third"] })
        );
    }
}
