//! 绑定配置
//!
//! `BinderConfiguration` 组装解析器注册表和自省器链（扫描预热 -> 缓存 -> 默认自省），
//! 生成的 `BinderContext` 通过 axum `Extension` 层共享给提取器：
//!
//! ```ignore
//! let context = BinderConfiguration::from_environment(&env)
//!     .add_package_to_scan("app::requests")
//!     .add_resolver(Arc::new(TenantResolver))
//!     .build()?;
//!
//! let app = Router::new()
//!     .route("/search", get(search))
//!     .layer(Extension(context));
//! ```
//!
//! 没有安装 `Extension` 时提取器使用进程级的默认上下文。

use std::sync::Arc;

use axum::Extension;
use chimera_bind::{
    AnnotatedRequestBeanIntrospector, ClassPathScanningAnnotatedRequestBeanIntrospector,
    DefaultAnnotatedRequestBeanIntrospector, Environment, EnvironmentPropertySource,
    IntrospectionError, ResolutionPlan, TypeInfo, ENV_PREFIX,
};
use once_cell::sync::Lazy;

use crate::properties::BinderProperties;
use crate::resolver::{default_property_resolver_registry, RequestPropertyResolver, ResolverRegistry};

type Introspector = ClassPathScanningAnnotatedRequestBeanIntrospector<dyn RequestPropertyResolver>;

/// 绑定上下文：自省器 + 配置
pub struct BinderContext {
    introspector: Introspector,
    properties: Arc<BinderProperties>,
}

static DEFAULT_CONTEXT: Lazy<Arc<BinderContext>> = Lazy::new(|| {
    let env = Environment::new();
    env.add_property_source(Box::new(EnvironmentPropertySource::new(ENV_PREFIX)));
    Arc::new(BinderConfiguration::from_environment(&env).assemble())
});

impl BinderContext {
    /// 进程级默认上下文，只包含内置解析器，不做预热
    pub fn global() -> Arc<BinderContext> {
        Arc::clone(&DEFAULT_CONTEXT)
    }

    pub fn properties(&self) -> &Arc<BinderProperties> {
        &self.properties
    }

    /// 获取类型的解析计划（命中缓存或构建一次）
    pub fn resolution_plan(
        &self,
        target: &TypeInfo,
    ) -> Result<Arc<ResolutionPlan<dyn RequestPropertyResolver>>, IntrospectionError> {
        self.introspector.resolver_map_for(target)
    }

    /// 已缓存解析计划的类型数量
    pub fn cached_types(&self) -> usize {
        self.introspector.cache().cached_types()
    }

    pub fn is_cached(&self, target: &TypeInfo) -> bool {
        self.introspector.cache().is_cached(target)
    }

    /// 预热的模块路径
    pub fn packages_to_scan(&self) -> &[String] {
        self.introspector.base_packages()
    }
}

impl std::fmt::Debug for BinderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinderContext")
            .field("packages_to_scan", &self.packages_to_scan())
            .field("cached_types", &self.cached_types())
            .field("properties", &self.properties)
            .finish()
    }
}

/// 绑定配置构建器
pub struct BinderConfiguration {
    properties: BinderProperties,
    resolvers: ResolverRegistry,
}

impl BinderConfiguration {
    pub fn new() -> Self {
        Self::with_properties(BinderProperties::default())
    }

    pub fn with_properties(properties: BinderProperties) -> Self {
        Self {
            properties,
            resolvers: ResolverRegistry::new(),
        }
    }

    /// 从 Environment 加载 `chimera.bind.*` 配置
    pub fn from_environment(env: &Environment) -> Self {
        Self::with_properties(BinderProperties::from_environment(env))
    }

    pub fn add_package_to_scan(mut self, package: impl Into<String>) -> Self {
        let package = package.into();
        if !self.properties.packages_to_scan.contains(&package) {
            self.properties.packages_to_scan.push(package);
        }
        self
    }

    pub fn packages_to_scan<I>(mut self, packages: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for package in packages {
            self = self.add_package_to_scan(package);
        }
        self
    }

    /// 添加自定义解析器，排在内置解析器之后
    pub fn add_resolver(mut self, resolver: Arc<dyn RequestPropertyResolver>) -> Self {
        self.resolvers.add_resolver(resolver);
        self
    }

    pub fn add_resolvers<I>(mut self, resolvers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn RequestPropertyResolver>>,
    {
        self.resolvers.add_resolvers(resolvers);
        self
    }

    pub fn add_registry(mut self, registry: &ResolverRegistry) -> Self {
        self.resolvers.add_registry(registry);
        self
    }

    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.properties.max_body_size = max_body_size;
        self
    }

    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.properties.default_locale = locale.into();
        self
    }

    pub fn properties(&self) -> &BinderProperties {
        &self.properties
    }

    /// 组装上下文，不做预热
    fn assemble(self) -> BinderContext {
        let mut registry = default_property_resolver_registry();
        registry.add_registry(&self.resolvers);
        tracing::debug!(resolvers = ?registry, "Property resolver registry created");

        let delegate: Arc<dyn AnnotatedRequestBeanIntrospector<dyn RequestPropertyResolver>> =
            Arc::new(DefaultAnnotatedRequestBeanIntrospector::new(registry));
        let introspector = ClassPathScanningAnnotatedRequestBeanIntrospector::new(
            delegate,
            self.properties.packages_to_scan.clone(),
        );

        BinderContext {
            introspector,
            properties: Arc::new(self.properties),
        }
    }

    /// 构建上下文并预热，任何请求 Bean 自省失败都会返回错误
    pub fn build(self) -> Result<Arc<BinderContext>, IntrospectionError> {
        let context = self.assemble();
        let warmed = context.introspector.warm_up().map_err(|e| {
            tracing::error!(error = %e, "Unable to create request bean introspector");
            e
        })?;
        tracing::info!(
            packages = ?context.packages_to_scan(),
            request_beans = warmed,
            "Request bean binder initialized"
        );
        Ok(Arc::new(context))
    }

    /// 构建上下文并包装为 axum `Extension` 层
    pub fn layer(self) -> Result<Extension<Arc<BinderContext>>, IntrospectionError> {
        self.build().map(Extension)
    }
}

impl Default for BinderConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
