//! Bean 属性与绑定属性
//!
//! `PropertyDescriptor` 描述一个 Bean 属性（名称、读写访问器、字段注解），
//! `BindingProperty` 在其之上同时提供两种视图：
//!
//! - 类型视图：规范类型 + 合并后的注解，供解析器判断与类型转换使用
//! - 参数视图：`MethodParameter`，供请求体读取等需要"方法参数"形态的 API 使用

use std::borrow::Cow;

use crate::annotation::{Annotation, AnnotationKind, Annotations};
use crate::error::{BodyDecodeError, IntrospectionError};
use crate::types::{BodyFormat, TypeInfo};
use crate::value::PropertyValue;

/// 访问器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    /// getter
    Read,
    /// setter
    Write,
}

/// 属性访问器（getter 或 setter）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    name: Cow<'static, str>,
    kind: AccessorKind,
    type_info: TypeInfo,
    annotations: Vec<Annotation>,
}

impl Accessor {
    /// getter，`type_info` 为返回类型
    pub fn read(name: impl Into<Cow<'static, str>>, type_info: TypeInfo) -> Self {
        Self {
            name: name.into(),
            kind: AccessorKind::Read,
            type_info,
            annotations: Vec::new(),
        }
    }

    /// setter，`type_info` 为唯一参数的类型
    pub fn write(name: impl Into<Cow<'static, str>>, type_info: TypeInfo) -> Self {
        Self {
            name: name.into(),
            kind: AccessorKind::Write,
            type_info,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AccessorKind {
        self.kind
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// Bean 属性描述
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: Cow<'static, str>,
    owner: TypeInfo,
    read: Option<Accessor>,
    write: Option<Accessor>,
    field_annotations: Vec<Annotation>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, owner: TypeInfo) -> Self {
        Self {
            name: name.into(),
            owner,
            read: None,
            write: None,
            field_annotations: Vec::new(),
        }
    }

    /// 字段形式的属性：getter 与 setter 类型相同
    pub fn field(name: &'static str, owner: TypeInfo, type_info: TypeInfo) -> Self {
        Self::new(name, owner)
            .with_read(Accessor::read(name, type_info.clone()))
            .with_write(Accessor::write(format!("set_{}", name), type_info))
    }

    pub fn with_read(mut self, accessor: Accessor) -> Self {
        self.read = Some(accessor);
        self
    }

    pub fn with_write(mut self, accessor: Accessor) -> Self {
        self.write = Some(accessor);
        self
    }

    pub fn with_field_annotation(mut self, annotation: Annotation) -> Self {
        self.field_annotations.push(annotation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 声明该属性的类型
    pub fn owner(&self) -> &TypeInfo {
        &self.owner
    }

    pub fn read_accessor(&self) -> Option<&Accessor> {
        self.read.as_ref()
    }

    pub fn write_accessor(&self) -> Option<&Accessor> {
        self.write.as_ref()
    }

    pub fn field_annotations(&self) -> &[Annotation] {
        &self.field_annotations
    }

    /// 属性类型：优先取 getter 的返回类型
    pub fn property_type(&self) -> Option<&TypeInfo> {
        self.read
            .as_ref()
            .or(self.write.as_ref())
            .map(Accessor::type_info)
    }
}

/// 访问器的方法参数视图
///
/// getter 作为伪返回值时索引为 -1，setter 的唯一参数索引为 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    accessor_name: Cow<'static, str>,
    accessor_kind: AccessorKind,
    parameter_index: i32,
    parameter_type: TypeInfo,
    containing_type: TypeInfo,
}

impl MethodParameter {
    fn for_accessor(accessor: &Accessor, containing_type: &TypeInfo) -> Self {
        let parameter_index = match accessor.kind {
            AccessorKind::Read => -1,
            AccessorKind::Write => 0,
        };
        Self {
            accessor_name: accessor.name.clone(),
            accessor_kind: accessor.kind,
            parameter_index,
            parameter_type: accessor.type_info.clone(),
            containing_type: containing_type.clone(),
        }
    }

    pub fn accessor_name(&self) -> &str {
        &self.accessor_name
    }

    pub fn accessor_kind(&self) -> AccessorKind {
        self.accessor_kind
    }

    pub fn parameter_index(&self) -> i32 {
        self.parameter_index
    }

    pub fn parameter_type(&self) -> &TypeInfo {
        &self.parameter_type
    }

    pub fn containing_type(&self) -> &TypeInfo {
        &self.containing_type
    }

    /// 按参数类型读取请求体，空请求体返回 `None`
    pub fn read_body(
        &self,
        format: BodyFormat,
        body: &[u8],
    ) -> Result<Option<PropertyValue>, BodyDecodeError> {
        let decoder = self
            .parameter_type
            .body_decoder()
            .ok_or(BodyDecodeError::Unreadable(self.parameter_type.name()))?;

        if body.is_empty() {
            return Ok(None);
        }

        decoder(format, body).map(|value| Some(PropertyValue::Object(value)))
    }
}

/// 绑定属性
///
/// 由至少有一个访问器的属性构造。若 getter 与 setter 类型不同且 setter 类型可由 getter
/// 类型赋值（协变 getter），使用 getter 的视图，否则使用 setter 的视图。
///
/// 注解按 getter、setter、字段的顺序合并，后者覆盖前者的同类注解。
#[derive(Debug, Clone)]
pub struct BindingProperty {
    name: Cow<'static, str>,
    type_info: TypeInfo,
    object_type: TypeInfo,
    annotations: Annotations,
    method_parameter: MethodParameter,
}

impl BindingProperty {
    /// 从属性描述构造
    pub fn for_property_descriptor(
        descriptor: &PropertyDescriptor,
    ) -> Result<Self, IntrospectionError> {
        let accessor = Self::canonical_accessor(descriptor)?;

        let mut annotations = Annotations::new();
        if let Some(read) = descriptor.read_accessor() {
            annotations.merge(read.annotations());
        }
        if let Some(write) = descriptor.write_accessor() {
            annotations.merge(write.annotations());
        }
        annotations.merge(descriptor.field_annotations());

        Ok(Self {
            name: descriptor.name.clone(),
            type_info: accessor.type_info.clone(),
            object_type: descriptor.owner.clone(),
            annotations,
            method_parameter: MethodParameter::for_accessor(accessor, &descriptor.owner),
        })
    }

    fn canonical_accessor(descriptor: &PropertyDescriptor) -> Result<&Accessor, IntrospectionError> {
        match (descriptor.read_accessor(), descriptor.write_accessor()) {
            (None, None) => Err(IntrospectionError::IllegalState(format!(
                "Property does not have a getter or setter method: {}.{}",
                descriptor.owner.name(),
                descriptor.name()
            ))),
            (Some(read), None) => Ok(read),
            (None, Some(write)) => Ok(write),
            (Some(read), Some(write)) => {
                let read_type = read.type_info();
                let write_type = write.type_info();
                if write_type != read_type && write_type.is_assignable_from(read_type) {
                    Ok(read)
                } else {
                    Ok(write)
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_annotation(&self, kind: AnnotationKind) -> bool {
        self.annotations.contains(kind)
    }

    pub fn get_annotation(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.annotations.get(kind)
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// 规范类型
    pub fn get_type(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 声明该属性的类型
    pub fn get_object_type(&self) -> &TypeInfo {
        &self.object_type
    }

    pub fn get_method_parameter(&self) -> &MethodParameter {
        &self.method_parameter
    }
}

impl PartialEq for BindingProperty {
    fn eq(&self, other: &Self) -> bool {
        self.type_info == other.type_info && self.method_parameter == other.method_parameter
    }
}

impl Eq for BindingProperty {}
