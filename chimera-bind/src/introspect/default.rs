use std::sync::Arc;

use crate::annotation::AnnotationKind;
use crate::error::IntrospectionError;
use crate::property::{BindingProperty, PropertyDescriptor};
use crate::registry::PropertyResolverRegistry;
use crate::resolver::RequestPropertyResolverBase;
use crate::types::TypeInfo;

use super::{AnnotatedRequestBeanIntrospector, ResolutionPlan, ResolvedPropertyData};

/// 默认自省器
///
/// 遍历目标类型的属性：
/// - 标注 `BeanParameter` 且不是简单类型的属性递归进入，路径以 `.` 连接
/// - 其他属性交给注册表查找解析器，找不到则跳过
///
/// 嵌套类型出现环时整体失败，不返回部分结果。
pub struct DefaultAnnotatedRequestBeanIntrospector<R: ?Sized> {
    registry: PropertyResolverRegistry<R>,
}

impl<R: ?Sized + RequestPropertyResolverBase> DefaultAnnotatedRequestBeanIntrospector<R> {
    pub fn new(registry: PropertyResolverRegistry<R>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PropertyResolverRegistry<R> {
        &self.registry
    }

    fn collect(
        &self,
        target: &TypeInfo,
        prefix: Option<&str>,
        entries: &mut Vec<ResolvedPropertyData<R>>,
        visiting: &mut VisitingTypes,
    ) -> Result<(), IntrospectionError> {
        let descriptors = target
            .property_descriptors()
            .map_err(|e| IntrospectionError::introspection(target.name(), e))?;

        for descriptor in &descriptors {
            let property_name = property_name(prefix, descriptor);
            let property = BindingProperty::for_property_descriptor(descriptor)?;

            if property.has_annotation(AnnotationKind::BeanParameter) && !property.get_type().is_simple() {
                let nested = property.get_type().unwrap_optional().clone();
                if !visiting.enter(&nested) {
                    return Err(IntrospectionError::CircularReference {
                        cycle: visiting.names(),
                    });
                }
                tracing::trace!(property = %property_name, nested = nested.name(), "Descending into bean parameter");
                self.collect(&nested, Some(&property_name), entries, visiting)?;
                visiting.leave(&nested);
            } else {
                match self.registry.find_resolver_for(&property) {
                    Some(resolver) => {
                        tracing::trace!(property = %property_name, resolver = resolver.name(), "Resolver found");
                        entries.push(ResolvedPropertyData::new(property_name, property, resolver));
                    }
                    None => continue,
                }
            }
        }

        Ok(())
    }
}

impl<R> AnnotatedRequestBeanIntrospector<R> for DefaultAnnotatedRequestBeanIntrospector<R>
where
    R: ?Sized + RequestPropertyResolverBase,
{
    fn resolver_map_for(&self, target: &TypeInfo) -> Result<Arc<ResolutionPlan<R>>, IntrospectionError> {
        let mut entries = Vec::new();
        let mut visiting = VisitingTypes::default();
        self.collect(target, None, &mut entries, &mut visiting)?;

        tracing::debug!(
            target_type = target.name(),
            properties = entries.len(),
            "Built resolution plan"
        );
        Ok(Arc::new(ResolutionPlan::new(target.clone(), entries)))
    }
}

fn property_name(prefix: Option<&str>, descriptor: &PropertyDescriptor) -> String {
    match prefix {
        None => descriptor.name().to_string(),
        Some(prefix) => format!("{}.{}", prefix, descriptor.name()),
    }
}

/// 当前递归路径上正在访问的嵌套类型，保持访问顺序
#[derive(Debug, Default)]
struct VisitingTypes {
    types: Vec<TypeInfo>,
}

impl VisitingTypes {
    /// 已在访问中返回 false
    fn enter(&mut self, type_info: &TypeInfo) -> bool {
        if self.types.contains(type_info) {
            return false;
        }
        self.types.push(type_info.clone());
        true
    }

    fn leave(&mut self, type_info: &TypeInfo) {
        self.types.retain(|t| t != type_info);
    }

    fn names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.name().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::property::Accessor;

    struct HeaderResolver;

    impl RequestPropertyResolverBase for HeaderResolver {
        fn supports(&self, property: &BindingProperty) -> bool {
            property.has_annotation(AnnotationKind::HeaderParameter)
        }
    }

    struct Plain;
    struct Leaf;
    struct Parent;
    struct Siblings;
    struct SelfRef;
    struct Outer;
    struct Inner;
    struct Broken;
    struct Ghost;

    fn introspector() -> DefaultAnnotatedRequestBeanIntrospector<dyn RequestPropertyResolverBase> {
        let mut registry: PropertyResolverRegistry<dyn RequestPropertyResolverBase> =
            PropertyResolverRegistry::new();
        registry.add_resolver(Arc::new(HeaderResolver));
        DefaultAnnotatedRequestBeanIntrospector::new(registry)
    }

    fn header(name: &'static str, owner: TypeInfo) -> PropertyDescriptor {
        PropertyDescriptor::field(name, owner, TypeInfo::of::<String>())
            .with_field_annotation(Annotation::named(AnnotationKind::HeaderParameter, name))
    }

    fn nested(name: &'static str, owner: TypeInfo, nested: TypeInfo) -> PropertyDescriptor {
        PropertyDescriptor::field(name, owner, nested)
            .with_field_annotation(Annotation::new(AnnotationKind::BeanParameter))
    }

    fn plain() -> TypeInfo {
        TypeInfo::bean::<Plain>(|| {
            Ok(vec![PropertyDescriptor::field(
                "name",
                TypeInfo::opaque::<Plain>(),
                TypeInfo::of::<String>(),
            )])
        })
    }

    fn leaf() -> TypeInfo {
        TypeInfo::bean::<Leaf>(|| Ok(vec![header("v", TypeInfo::opaque::<Leaf>())]))
    }

    fn parent() -> TypeInfo {
        TypeInfo::bean::<Parent>(|| {
            Ok(vec![
                header("top", TypeInfo::opaque::<Parent>()),
                nested("child", TypeInfo::opaque::<Parent>(), leaf()),
                PropertyDescriptor::field("ignored", TypeInfo::opaque::<Parent>(), TypeInfo::of::<i32>()),
            ])
        })
    }

    fn siblings() -> TypeInfo {
        TypeInfo::bean::<Siblings>(|| {
            Ok(vec![
                nested("left", TypeInfo::opaque::<Siblings>(), leaf()),
                nested("right", TypeInfo::opaque::<Siblings>(), leaf()),
            ])
        })
    }

    fn self_ref() -> TypeInfo {
        TypeInfo::bean::<SelfRef>(|| Ok(vec![nested("me", TypeInfo::opaque::<SelfRef>(), self_ref())]))
    }

    fn outer() -> TypeInfo {
        TypeInfo::bean::<Outer>(|| Ok(vec![nested("inner", TypeInfo::opaque::<Outer>(), inner())]))
    }

    fn inner() -> TypeInfo {
        TypeInfo::bean::<Inner>(|| {
            Ok(vec![
                header("h", TypeInfo::opaque::<Inner>()),
                nested("outer", TypeInfo::opaque::<Inner>(), outer()),
            ])
        })
    }

    fn broken() -> TypeInfo {
        TypeInfo::bean::<Broken>(|| Err(IntrospectionError::IllegalState("accessor not visible".to_string())))
    }

    fn ghost() -> TypeInfo {
        TypeInfo::bean::<Ghost>(|| Ok(vec![PropertyDescriptor::new("nothing", TypeInfo::opaque::<Ghost>())]))
    }

    #[test]
    fn test_no_bindable_properties() {
        let plan = introspector().resolver_map_for(&plain()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_nested_path_naming() {
        let plan = introspector().resolver_map_for(&parent()).unwrap();
        assert_eq!(plan.property_names().collect::<Vec<_>>(), vec!["top", "child.v"]);
        assert!(!plan.contains("ignored"));
        assert_eq!(plan.get("child.v").unwrap().binding_property().name(), "v");
    }

    #[test]
    fn test_sibling_branches_reuse_nested_type() {
        let plan = introspector().resolver_map_for(&siblings()).unwrap();
        assert_eq!(plan.property_names().collect::<Vec<_>>(), vec!["left.v", "right.v"]);
    }

    #[test]
    fn test_self_reference_is_circular() {
        let err = introspector().resolver_map_for(&self_ref()).unwrap_err();
        assert!(err.is_circular_reference());
        assert!(err.to_string().contains("SelfRef"));
    }

    #[test]
    fn test_transitive_cycle_lists_types_in_order() {
        let err = introspector().resolver_map_for(&outer()).unwrap_err();
        match err {
            IntrospectionError::CircularReference { cycle } => {
                assert_eq!(cycle.len(), 2);
                assert!(cycle[0].ends_with("Inner"));
                assert!(cycle[1].ends_with("Outer"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_enumeration_failure_is_wrapped() {
        let err = introspector().resolver_map_for(&broken()).unwrap_err();
        match &err {
            IntrospectionError::RequestBeanIntrospection { type_name, .. } => {
                assert!(type_name.ends_with("Broken"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().starts_with("Unable to introspect request bean of type"));
        assert!(err.to_string().contains("accessor not visible"));
    }

    #[test]
    fn test_property_without_accessors_fails() {
        let err = introspector().resolver_map_for(&ghost()).unwrap_err();
        assert!(matches!(err, IntrospectionError::IllegalState(_)));
    }

    #[test]
    fn test_simple_bean_parameter_is_resolved_directly() {
        struct Holder;
        let holder = TypeInfo::bean::<Holder>(|| {
            Ok(vec![PropertyDescriptor::new("raw", TypeInfo::opaque::<Holder>())
                .with_write(
                    Accessor::write("set_raw", TypeInfo::of::<String>())
                        .with_annotation(Annotation::new(AnnotationKind::BeanParameter))
                        .with_annotation(Annotation::named(AnnotationKind::HeaderParameter, "raw")),
                )])
        });

        let plan = introspector().resolver_map_for(&holder).unwrap();
        assert!(plan.contains("raw"));
    }

    #[test]
    fn test_resolvers_for_keeps_order() {
        let entries = introspector().resolvers_for(&parent()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.property_name().to_string()).collect();
        assert_eq!(names, vec!["top", "child.v"]);
        assert_eq!(entries[0], entries[0].clone());
        assert!(entries[0] != entries[1]);
    }
}
