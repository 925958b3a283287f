use std::sync::Arc;

use crate::bean::request_beans_in_package;
use crate::error::IntrospectionError;
use crate::resolver::RequestPropertyResolverBase;
use crate::types::TypeInfo;

use super::{AnnotatedRequestBeanIntrospector, CachedAnnotatedRequestBeanIntrospector, ResolutionPlan};

/// 扫描预热自省器
///
/// 在指定模块路径下查找 `#[request_bean]` 类型，启动时提前构建并缓存解析计划，
/// 这样第一个请求不需要承担自省开销。任何一个类型自省失败都会中止预热。
pub struct ClassPathScanningAnnotatedRequestBeanIntrospector<R: ?Sized> {
    cache: CachedAnnotatedRequestBeanIntrospector<R>,
    base_packages: Vec<String>,
}

impl<R: ?Sized + RequestPropertyResolverBase + 'static> ClassPathScanningAnnotatedRequestBeanIntrospector<R> {
    pub fn new<I>(delegate: Arc<dyn AnnotatedRequestBeanIntrospector<R>>, base_packages: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut packages: Vec<String> = Vec::new();
        for package in base_packages {
            let package = package.into();
            if !packages.contains(&package) {
                packages.push(package);
            }
        }

        Self {
            cache: CachedAnnotatedRequestBeanIntrospector::new(delegate),
            base_packages: packages,
        }
    }

    pub fn base_packages(&self) -> &[String] {
        &self.base_packages
    }

    /// 底层缓存
    pub fn cache(&self) -> &CachedAnnotatedRequestBeanIntrospector<R> {
        &self.cache
    }

    /// 扫描所有配置的模块路径并预热缓存，返回预热的类型数量
    ///
    /// 重复调用是安全的：已缓存的类型直接命中缓存
    pub fn warm_up(&self) -> Result<usize, IntrospectionError> {
        let mut warmed = 0;
        for package in &self.base_packages {
            warmed += self.scan_and_load_request_beans(package)?;
        }
        Ok(warmed)
    }

    fn scan_and_load_request_beans(&self, package: &str) -> Result<usize, IntrospectionError> {
        tracing::debug!("Searching for #[request_bean] annotated types in package [{}]", package);
        let candidates = request_beans_in_package(package);
        tracing::debug!(
            "Found {} annotated types in package [{}]",
            candidates.len(),
            package
        );

        for (idx, candidate) in candidates.iter().enumerate() {
            tracing::debug!(
                "[{}/{}] Introspecting request bean {}",
                idx + 1,
                candidates.len(),
                candidate.type_name
            );
            let type_info = (candidate.type_info)();
            self.cache
                .resolver_map_for(&type_info)
                .map_err(|e| IntrospectionError::introspection(candidate.type_name, e))?;
        }

        Ok(candidates.len())
    }
}

impl<R> AnnotatedRequestBeanIntrospector<R> for ClassPathScanningAnnotatedRequestBeanIntrospector<R>
where
    R: ?Sized + RequestPropertyResolverBase + 'static,
{
    fn resolver_map_for(&self, target: &TypeInfo) -> Result<Arc<ResolutionPlan<R>>, IntrospectionError> {
        self.cache.resolver_map_for(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, AnnotationKind};
    use crate::bean::RequestBeanRegistration;
    use crate::introspect::DefaultAnnotatedRequestBeanIntrospector;
    use crate::property::{BindingProperty, PropertyDescriptor};
    use crate::registry::PropertyResolverRegistry;

    type Resolver = dyn RequestPropertyResolverBase;

    struct HeaderResolver;

    impl RequestPropertyResolverBase for HeaderResolver {
        fn supports(&self, property: &BindingProperty) -> bool {
            property.has_annotation(AnnotationKind::HeaderParameter)
        }
    }

    mod beans {
        use super::*;

        pub mod good {
            use super::*;

            pub struct Scanned;

            pub fn scanned() -> TypeInfo {
                TypeInfo::bean::<Scanned>(|| {
                    Ok(vec![PropertyDescriptor::field(
                        "h",
                        TypeInfo::opaque::<Scanned>(),
                        TypeInfo::of::<String>(),
                    )
                    .with_field_annotation(Annotation::named(AnnotationKind::HeaderParameter, "h"))])
                })
            }

            inventory::submit! {
                RequestBeanRegistration {
                    type_name: "beans::good::Scanned",
                    module_path: module_path!(),
                    type_info: scanned,
                }
            }
        }

        pub mod cyclic {
            use super::*;

            pub struct Loop;

            pub fn looping() -> TypeInfo {
                TypeInfo::bean::<Loop>(|| {
                    Ok(vec![PropertyDescriptor::field("again", TypeInfo::opaque::<Loop>(), looping())
                        .with_field_annotation(Annotation::new(AnnotationKind::BeanParameter))])
                })
            }

            inventory::submit! {
                RequestBeanRegistration {
                    type_name: "beans::cyclic::Loop",
                    module_path: module_path!(),
                    type_info: looping,
                }
            }
        }
    }

    fn delegate() -> Arc<dyn AnnotatedRequestBeanIntrospector<Resolver>> {
        let mut registry: PropertyResolverRegistry<Resolver> = PropertyResolverRegistry::new();
        registry.add_resolver(Arc::new(HeaderResolver));
        Arc::new(DefaultAnnotatedRequestBeanIntrospector::new(registry))
    }

    fn package(suffix: &str) -> String {
        format!("{}::beans{}", module_path!(), suffix)
    }

    #[test]
    fn test_warm_up_populates_cache() {
        let introspector =
            ClassPathScanningAnnotatedRequestBeanIntrospector::new(delegate(), vec![package("::good")]);
        let scanned = beans::good::scanned();
        assert!(!introspector.cache().is_cached(&scanned));

        assert_eq!(introspector.warm_up().unwrap(), 1);
        assert!(introspector.cache().is_cached(&scanned));
        let first = introspector.resolver_map_for(&scanned).unwrap();
        assert!(first.contains("h"));

        // 重复预热直接命中缓存
        assert_eq!(introspector.warm_up().unwrap(), 1);
        let second = introspector.resolver_map_for(&scanned).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_parent_package_includes_sub_modules() {
        let introspector =
            ClassPathScanningAnnotatedRequestBeanIntrospector::new(delegate(), vec![package("")]);
        assert!(introspector.warm_up().is_err());
    }

    #[test]
    fn test_warm_up_only_matching_package() {
        let introspector = ClassPathScanningAnnotatedRequestBeanIntrospector::new(
            delegate(),
            vec!["some::other::package".to_string()],
        );
        assert_eq!(introspector.warm_up().unwrap(), 0);
        assert_eq!(introspector.cache().cached_types(), 0);
    }

    #[test]
    fn test_warm_up_failure_names_type() {
        let introspector =
            ClassPathScanningAnnotatedRequestBeanIntrospector::new(delegate(), vec![package("::cyclic")]);
        let err = introspector.warm_up().unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Unable to introspect request bean of type beans::cyclic::Loop"));
        assert!(err.to_string().contains("Circular reference found"));
    }

    #[test]
    fn test_packages_are_deduplicated() {
        let introspector = ClassPathScanningAnnotatedRequestBeanIntrospector::new(
            delegate(),
            vec!["a::b", "a::b", "c"],
        );
        assert_eq!(introspector.base_packages(), &["a::b".to_string(), "c".to_string()]);
    }
}
