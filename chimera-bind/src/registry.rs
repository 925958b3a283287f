//! 解析器注册表
//!
//! 按注册顺序保存解析器，查找时返回第一个支持该属性的解析器。
//! 先注册的自定义解析器可以覆盖内置解析器；同一个解析器可以注册多次，不做去重。

use std::fmt;
use std::sync::Arc;

use crate::property::BindingProperty;
use crate::resolver::RequestPropertyResolverBase;

/// 有序的解析器注册表
pub struct PropertyResolverRegistry<R: ?Sized> {
    resolvers: Vec<Arc<R>>,
}

impl<R: ?Sized + RequestPropertyResolverBase> PropertyResolverRegistry<R> {
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// 追加一个解析器
    pub fn add_resolver(&mut self, resolver: Arc<R>) -> &mut Self {
        tracing::debug!(resolver = resolver.name(), "Adding property resolver");
        self.resolvers.push(resolver);
        self
    }

    /// 按顺序追加多个解析器
    pub fn add_resolvers<I>(&mut self, resolvers: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<R>>,
    {
        for resolver in resolvers {
            self.add_resolver(resolver);
        }
        self
    }

    /// 追加另一个注册表中的全部解析器
    pub fn add_registry(&mut self, other: &PropertyResolverRegistry<R>) -> &mut Self {
        self.resolvers.extend(other.resolvers.iter().cloned());
        self
    }

    /// 第一个支持该属性的解析器
    pub fn find_resolver_for(&self, property: &BindingProperty) -> Option<Arc<R>> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.supports(property))
            .cloned()
    }

    pub fn property_resolvers(&self) -> &[Arc<R>] {
        &self.resolvers
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl<R: ?Sized + RequestPropertyResolverBase> Default for PropertyResolverRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ?Sized> Clone for PropertyResolverRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            resolvers: self.resolvers.clone(),
        }
    }
}

impl<R: ?Sized + RequestPropertyResolverBase> fmt::Debug for PropertyResolverRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.resolvers.iter().map(|r| r.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, AnnotationKind};
    use crate::property::PropertyDescriptor;
    use crate::types::TypeInfo;

    struct Owner;

    struct AnnotationResolver {
        kind: AnnotationKind,
        label: &'static str,
    }

    impl RequestPropertyResolverBase for AnnotationResolver {
        fn supports(&self, property: &BindingProperty) -> bool {
            property.has_annotation(self.kind)
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    fn resolver(kind: AnnotationKind, label: &'static str) -> Arc<dyn RequestPropertyResolverBase> {
        Arc::new(AnnotationResolver { kind, label })
    }

    fn header_property() -> BindingProperty {
        let descriptor = PropertyDescriptor::field("h", TypeInfo::opaque::<Owner>(), TypeInfo::of::<String>())
            .with_field_annotation(Annotation::named(AnnotationKind::HeaderParameter, "h"));
        BindingProperty::for_property_descriptor(&descriptor).unwrap()
    }

    #[test]
    fn test_first_registered_wins() {
        let mut registry = PropertyResolverRegistry::new();
        registry
            .add_resolver(resolver(AnnotationKind::CookieParameter, "cookie"))
            .add_resolver(resolver(AnnotationKind::HeaderParameter, "custom-header"))
            .add_resolver(resolver(AnnotationKind::HeaderParameter, "header"));

        let found = registry.find_resolver_for(&header_property()).unwrap();
        assert_eq!(found.name(), "custom-header");
    }

    #[test]
    fn test_no_match() {
        let mut registry = PropertyResolverRegistry::new();
        registry.add_resolver(resolver(AnnotationKind::CookieParameter, "cookie"));
        assert!(registry.find_resolver_for(&header_property()).is_none());
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let header = resolver(AnnotationKind::HeaderParameter, "header");
        let mut registry = PropertyResolverRegistry::new();
        registry.add_resolvers(vec![header.clone(), header.clone()]);
        assert_eq!(registry.len(), 2);

        let found = registry.find_resolver_for(&header_property()).unwrap();
        assert!(Arc::ptr_eq(&found, &registry.property_resolvers()[0]));
    }

    #[test]
    fn test_add_registry_appends() {
        let mut defaults = PropertyResolverRegistry::new();
        defaults.add_resolver(resolver(AnnotationKind::HeaderParameter, "header"));

        let mut custom = PropertyResolverRegistry::new();
        custom.add_resolver(resolver(AnnotationKind::CookieParameter, "cookie"));

        defaults.add_registry(&custom);
        let names: Vec<_> = defaults
            .property_resolvers()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["header", "cookie"]);
    }
}
