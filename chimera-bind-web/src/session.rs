//! Session
//!
//! 绑定只读取 Session，不负责创建和持久化。应用的中间件把 `Session` 放入请求扩展：
//!
//! ```ignore
//! async fn session_layer(mut req: Request, next: Next) -> Response {
//!     let session = store.load(&req).await.unwrap_or_else(Session::new);
//!     req.extensions_mut().insert(session);
//!     next.run(req).await
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chimera_bind::{ConversionError, FromPropertyValue, PropertyValue, Reflect, TypeInfo};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// 会话，克隆后共享同一份属性
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    attributes: Arc<RwLock<HashMap<String, Value>>>,
}

impl Session {
    /// 创建新会话，生成随机 ID
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.read().get(name).cloned()
    }

    /// 读取并反序列化属性
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.get_attribute(name)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: Value) {
        self.attributes.write().insert(name.into(), value);
    }

    /// 序列化并写入属性
    pub fn insert<T: Serialize>(&self, name: impl Into<String>, value: &T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.set_attribute(name, value);
        Ok(())
    }

    pub fn remove_attribute(&self, name: &str) -> Option<Value> {
        self.attributes.write().remove(name)
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.read().keys().cloned().collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Reflect for Session {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Session>()
    }
}

impl FromPropertyValue for Session {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        value.downcast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_are_shared_between_clones() {
        let session = Session::with_id("s-1");
        let clone = session.clone();

        clone.set_attribute("user", serde_json::json!("alice"));
        assert_eq!(session.get_attribute("user"), Some(serde_json::json!("alice")));
        assert_eq!(session.id(), "s-1");

        assert!(session.remove_attribute("user").is_some());
        assert!(clone.get_attribute("user").is_none());
    }

    #[test]
    fn test_typed_attributes() {
        let session = Session::new();
        session.insert("visits", &3u32).unwrap();
        assert_eq!(session.get::<u32>("visits"), Some(3));
        assert_eq!(session.get::<String>("visits"), None);
        assert!(!session.id().is_empty());
    }
}
