use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::error::IntrospectionError;
use crate::resolver::RequestPropertyResolverBase;
use crate::types::TypeInfo;

use super::{AnnotatedRequestBeanIntrospector, ResolutionPlan};

type PlanSlot<R> = Arc<OnceCell<Arc<ResolutionPlan<R>>>>;

/// 缓存自省器
///
/// 按类型缓存解析计划，不淘汰。同一类型的并发首次访问只会触发一次构建，
/// 其余调用方等待并拿到同一个计划。构建失败不会被缓存，下一次调用会重新构建。
pub struct CachedAnnotatedRequestBeanIntrospector<R: ?Sized> {
    delegate: Arc<dyn AnnotatedRequestBeanIntrospector<R>>,
    cache: RwLock<HashMap<TypeId, PlanSlot<R>>>,
}

impl<R: ?Sized + RequestPropertyResolverBase + 'static> CachedAnnotatedRequestBeanIntrospector<R> {
    pub fn new(delegate: Arc<dyn AnnotatedRequestBeanIntrospector<R>>) -> Self {
        Self {
            delegate,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// 获取（或创建）类型对应的缓存槽位
    fn slot(&self, target: &TypeInfo) -> PlanSlot<R> {
        if let Some(slot) = self.cache.read().get(&target.type_id()) {
            return Arc::clone(slot);
        }

        let mut cache = self.cache.write();
        Arc::clone(cache.entry(target.type_id()).or_default())
    }

    /// 已缓存的计划数量
    pub fn cached_types(&self) -> usize {
        self.cache
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// 是否已缓存该类型
    pub fn is_cached(&self, target: &TypeInfo) -> bool {
        self.cache
            .read()
            .get(&target.type_id())
            .is_some_and(|slot| slot.get().is_some())
    }
}

impl<R> AnnotatedRequestBeanIntrospector<R> for CachedAnnotatedRequestBeanIntrospector<R>
where
    R: ?Sized + RequestPropertyResolverBase + 'static,
{
    fn resolver_map_for(&self, target: &TypeInfo) -> Result<Arc<ResolutionPlan<R>>, IntrospectionError> {
        let slot = self.slot(target);

        if let Some(plan) = slot.get() {
            tracing::trace!(target_type = target.name(), "Resolution plan cache hit");
            return Ok(Arc::clone(plan));
        }

        // 槽位级别的初始化锁保证同一类型最多一个构建者，不同类型之间互不阻塞
        let plan = slot.get_or_try_init(|| {
            tracing::debug!(target_type = target.name(), "Resolution plan cache miss, introspecting");
            self.delegate.resolver_map_for(target)
        })?;
        Ok(Arc::clone(plan))
    }
}
