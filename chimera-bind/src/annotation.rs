//! 请求绑定注解
//!
//! 每个数据来源对应一种注解（查询参数、表单字段、路径变量、Cookie、请求头、
//! Session 属性、请求体、请求上下文），`BeanParameter` 标记需要递归自省的嵌套 Bean，
//! `RequestBean` 标记启动时需要预热的类型。
//!
//! 注解由 `#[derive(RequestBean)]` 生成，也可以在手写的 `PropertyDescriptor` 中直接构造：
//! ```ignore
//! let annotation = Annotation::named(AnnotationKind::HeaderParameter, "x-trace-id");
//! ```

use std::borrow::Cow;
use std::fmt;

/// 注解类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// 查询参数 - 类似 @RequestParameter
    RequestParameter,
    /// 表单字段（urlencoded 或 multipart）
    FormParameter,
    /// 路径变量
    PathParameter,
    /// Cookie
    CookieParameter,
    /// 请求头
    HeaderParameter,
    /// Session 属性
    SessionParameter,
    /// 请求体
    RequestBody,
    /// 请求上下文对象（Method、Uri、Session、Locale 等）
    RequestContext,
    /// 嵌套 Bean，递归自省而不是直接解析
    BeanParameter,
    /// 类级别标记，用于启动扫描
    RequestBean,
    /// 用户自定义注解，配合自定义解析器使用
    Custom(&'static str),
}

impl AnnotationKind {
    /// 注解名称
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::RequestParameter => "RequestParameter",
            AnnotationKind::FormParameter => "FormParameter",
            AnnotationKind::PathParameter => "PathParameter",
            AnnotationKind::CookieParameter => "CookieParameter",
            AnnotationKind::HeaderParameter => "HeaderParameter",
            AnnotationKind::SessionParameter => "SessionParameter",
            AnnotationKind::RequestBody => "RequestBody",
            AnnotationKind::RequestContext => "RequestContext",
            AnnotationKind::BeanParameter => "BeanParameter",
            AnnotationKind::RequestBean => "RequestBean",
            AnnotationKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name())
    }
}

/// 一个注解实例
///
/// `value` 为数据来源中的键名；为空或全是空白时表示绑定整个集合（仅对 Map 类型属性有效）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    kind: AnnotationKind,
    value: Option<Cow<'static, str>>,
}

impl Annotation {
    /// 不带名称的注解
    pub const fn new(kind: AnnotationKind) -> Self {
        Self { kind, value: None }
    }

    /// 带名称的注解
    pub const fn named(kind: AnnotationKind, value: &'static str) -> Self {
        Self {
            kind,
            value: Some(Cow::Borrowed(value)),
        }
    }

    /// 运行时构造的名称
    pub fn with_value(kind: AnnotationKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(Cow::Owned(value.into())),
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// 原始的 value，可能为空字符串
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// 去掉空白后仍有内容的名称
    pub fn name(&self) -> Option<&str> {
        self.value().map(str::trim).filter(|v| !v.is_empty())
    }

    /// 是否指定了名称
    pub fn has_name(&self) -> bool {
        self.name().is_some()
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{}(\"{}\")", self.kind, value),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// 合并后的注解集合，同一种注解只保留最后合并进来的那个
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    items: Vec<Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一组注解，已存在的同类注解会被替换
    pub fn merge<'a>(&mut self, annotations: impl IntoIterator<Item = &'a Annotation>) {
        for annotation in annotations {
            match self.items.iter_mut().find(|a| a.kind == annotation.kind) {
                Some(existing) => *existing = annotation.clone(),
                None => self.items.push(annotation.clone()),
            }
        }
    }

    pub fn get(&self, kind: AnnotationKind) -> Option<&Annotation> {
        self.items.iter().find(|a| a.kind == kind)
    }

    pub fn contains(&self, kind: AnnotationKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_value_has_no_name() {
        let annotation = Annotation::named(AnnotationKind::RequestParameter, "  ");
        assert_eq!(annotation.value(), Some("  "));
        assert!(!annotation.has_name());

        let annotation = Annotation::new(AnnotationKind::HeaderParameter);
        assert!(!annotation.has_name());

        let annotation = Annotation::with_value(AnnotationKind::CookieParameter, "c");
        assert_eq!(annotation.name(), Some("c"));
    }

    #[test]
    fn test_merge_replaces_same_kind() {
        let mut annotations = Annotations::new();
        annotations.merge(&[
            Annotation::named(AnnotationKind::HeaderParameter, "from-getter"),
            Annotation::new(AnnotationKind::RequestContext),
        ]);
        annotations.merge(&[Annotation::named(AnnotationKind::HeaderParameter, "from-field")]);

        assert_eq!(annotations.len(), 2);
        assert_eq!(
            annotations.get(AnnotationKind::HeaderParameter).and_then(|a| a.name()),
            Some("from-field")
        );
    }

    #[test]
    fn test_display() {
        let annotation = Annotation::named(AnnotationKind::CookieParameter, "c");
        assert_eq!(annotation.to_string(), "@CookieParameter(\"c\")");
        assert_eq!(AnnotationKind::Custom("Tenant").to_string(), "@Tenant");
    }
}
