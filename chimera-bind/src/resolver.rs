//! 属性解析器基础契约
//!
//! 每种数据来源对应一个解析器。自省阶段只关心"能否处理该属性"，
//! 具体的取值契约（异步、依赖请求对象）由 Web 层在此基础上扩展。

use crate::property::BindingProperty;

/// 解析器基础 trait
///
/// 调用方必须保证只对 `supports` 返回 true 的属性调用取值方法
pub trait RequestPropertyResolverBase: Send + Sync {
    /// 是否能处理该属性
    fn supports(&self, property: &BindingProperty) -> bool;

    /// 解析器名称，用于日志
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
