//! 请求 Bean 自省
//!
//! - `DefaultAnnotatedRequestBeanIntrospector`: 递归遍历属性图，生成解析计划
//! - `CachedAnnotatedRequestBeanIntrospector`: 按类型缓存解析计划，每个类型最多构建一次
//! - `ClassPathScanningAnnotatedRequestBeanIntrospector`: 启动时扫描 `#[request_bean]` 类型并预热缓存

mod cached;
mod default;
mod plan;
mod scanning;

pub use cached::CachedAnnotatedRequestBeanIntrospector;
pub use default::DefaultAnnotatedRequestBeanIntrospector;
pub use plan::{ResolutionPlan, ResolvedPropertyData};
pub use scanning::ClassPathScanningAnnotatedRequestBeanIntrospector;

use std::sync::Arc;

use crate::error::IntrospectionError;
use crate::types::TypeInfo;

/// 自省器 trait
pub trait AnnotatedRequestBeanIntrospector<R: ?Sized>: Send + Sync {
    /// 获取目标类型的解析计划（可能为空，但不会缺失）
    fn resolver_map_for(&self, target: &TypeInfo) -> Result<Arc<ResolutionPlan<R>>, IntrospectionError>;

    /// 按属性顺序返回解析计划中的条目
    fn resolvers_for(&self, target: &TypeInfo) -> Result<Vec<ResolvedPropertyData<R>>, IntrospectionError> {
        Ok(self.resolver_map_for(target)?.iter().cloned().collect())
    }
}

impl<R: ?Sized, I> AnnotatedRequestBeanIntrospector<R> for Arc<I>
where
    I: AnnotatedRequestBeanIntrospector<R> + ?Sized,
{
    fn resolver_map_for(&self, target: &TypeInfo) -> Result<Arc<ResolutionPlan<R>>, IntrospectionError> {
        (**self).resolver_map_for(target)
    }
}
