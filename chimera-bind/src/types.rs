//! 类型元数据
//!
//! `TypeInfo` 是自省引擎使用的"类"句柄：`TypeId` + 类型名 + 结构分类。
//! 相等性与哈希只看 `TypeId`。Bean 类型携带一个属性枚举函数，由
//! `#[derive(RequestBean)]` 生成。

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;

use crate::error::{BodyDecodeError, IntrospectionError};
use crate::property::PropertyDescriptor;

/// 属性枚举函数
pub type PropertiesFn = fn() -> Result<Vec<PropertyDescriptor>, IntrospectionError>;

/// 请求体解码函数
pub type BodyDecoder = fn(BodyFormat, &[u8]) -> Result<Box<dyn Any + Send + Sync>, BodyDecodeError>;

/// 请求体格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    UrlEncoded,
}

/// 类型分类
#[derive(Clone)]
pub enum TypeKind {
    /// 标量：数字、布尔、字符串等
    Simple,
    /// 单值 Map
    Map,
    /// 多值 Map
    MultiValueMap,
    /// 集合（`Vec<T>`）
    Collection(Box<TypeInfo>),
    /// 可选值（`Option<T>`）
    Optional(Box<TypeInfo>),
    /// 可自省的 Bean
    Bean(PropertiesFn),
    /// 其他类型
    Opaque,
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Simple => write!(f, "Simple"),
            TypeKind::Map => write!(f, "Map"),
            TypeKind::MultiValueMap => write!(f, "MultiValueMap"),
            TypeKind::Collection(elem) => write!(f, "Collection({})", elem.name()),
            TypeKind::Optional(inner) => write!(f, "Optional({})", inner.name()),
            TypeKind::Bean(_) => write!(f, "Bean"),
            TypeKind::Opaque => write!(f, "Opaque"),
        }
    }
}

/// 类型元数据
#[derive(Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
    assignable_to: Vec<TypeId>,
    body_decoder: Option<BodyDecoder>,
}

impl TypeInfo {
    fn with_kind<T: ?Sized + 'static>(kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind,
            assignable_to: Vec::new(),
            body_decoder: None,
        }
    }

    /// 通过 `Reflect` 获取
    pub fn of<T: Reflect>() -> Self {
        T::type_info()
    }

    pub fn simple<T: ?Sized + 'static>() -> Self {
        Self::with_kind::<T>(TypeKind::Simple)
    }

    pub fn opaque<T: ?Sized + 'static>() -> Self {
        Self::with_kind::<T>(TypeKind::Opaque)
    }

    pub fn map<T: ?Sized + 'static>() -> Self {
        Self::with_kind::<T>(TypeKind::Map)
    }

    pub fn multi_value_map<T: ?Sized + 'static>() -> Self {
        Self::with_kind::<T>(TypeKind::MultiValueMap)
    }

    pub fn collection<T: ?Sized + 'static>(element: TypeInfo) -> Self {
        Self::with_kind::<T>(TypeKind::Collection(Box::new(element)))
    }

    pub fn optional<T: ?Sized + 'static>(inner: TypeInfo) -> Self {
        Self::with_kind::<T>(TypeKind::Optional(Box::new(inner)))
    }

    pub fn bean<T: ?Sized + 'static>(properties: PropertiesFn) -> Self {
        Self::with_kind::<T>(TypeKind::Bean(properties))
    }

    /// 可从请求体反序列化的类型
    pub fn deserializable<T>() -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self::opaque::<T>().with_body_decoder(decode_body::<T>)
    }

    /// 声明当前类型可以赋值给 `U`（类似子类到父类）
    pub fn with_assignable_to<U: ?Sized + 'static>(mut self) -> Self {
        self.assignable_to.push(TypeId::of::<U>());
        self
    }

    pub fn with_body_decoder(mut self, decoder: BodyDecoder) -> Self {
        self.body_decoder = Some(decoder);
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// `Option<T>` 的内部类型，其他类型返回自身
    pub fn unwrap_optional(&self) -> &TypeInfo {
        match &self.kind {
            TypeKind::Optional(inner) => inner.unwrap_optional(),
            _ => self,
        }
    }

    /// 集合的元素类型
    pub fn element_type(&self) -> Option<&TypeInfo> {
        match &self.unwrap_optional().kind {
            TypeKind::Collection(elem) => Some(elem),
            _ => None,
        }
    }

    /// 是否为简单类型（标量或标量集合）
    pub fn is_simple(&self) -> bool {
        match &self.kind {
            TypeKind::Simple => true,
            TypeKind::Collection(elem) => elem.is_simple(),
            TypeKind::Optional(inner) => inner.is_simple(),
            _ => false,
        }
    }

    /// 是否为 Map（包括多值 Map）
    pub fn is_map(&self) -> bool {
        matches!(
            self.unwrap_optional().kind,
            TypeKind::Map | TypeKind::MultiValueMap
        )
    }

    pub fn is_multi_value_map(&self) -> bool {
        matches!(self.unwrap_optional().kind, TypeKind::MultiValueMap)
    }

    pub fn is_bean(&self) -> bool {
        matches!(self.unwrap_optional().kind, TypeKind::Bean(_))
    }

    /// `other` 的值能否赋给当前类型
    pub fn is_assignable_from(&self, other: &TypeInfo) -> bool {
        self.id == other.id || other.assignable_to.contains(&self.id)
    }

    /// 枚举 Bean 属性，非 Bean 类型没有属性
    pub fn property_descriptors(&self) -> Result<Vec<PropertyDescriptor>, IntrospectionError> {
        match &self.unwrap_optional().kind {
            TypeKind::Bean(properties) => properties(),
            _ => Ok(Vec::new()),
        }
    }

    pub fn body_decoder(&self) -> Option<BodyDecoder> {
        self.body_decoder
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn decode_body<T>(format: BodyFormat, body: &[u8]) -> Result<Box<dyn Any + Send + Sync>, BodyDecodeError>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let value: T = match format {
        BodyFormat::Json => serde_json::from_slice(body)?,
        BodyFormat::UrlEncoded => serde_urlencoded::from_bytes(body)?,
    };
    Ok(Box::new(value))
}

/// 提供类型元数据
///
/// 标量、集合、Map 和常用 HTTP 类型已内置实现；Bean 通过 `#[derive(RequestBean)]` 实现。
pub trait Reflect: 'static {
    fn type_info() -> TypeInfo;
}

macro_rules! impl_simple_reflect {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::simple::<$ty>()
                }
            }
        )*
    };
}

impl_simple_reflect!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::optional::<Option<T>>(T::type_info())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::collection::<Vec<T>>(T::type_info())
    }
}

/// 递归的嵌套 Bean 需要 `Box`，类型元数据与内部类型相同
impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }
}

impl Reflect for HashMap<String, String> {
    fn type_info() -> TypeInfo {
        TypeInfo::map::<Self>()
    }
}

impl Reflect for BTreeMap<String, String> {
    fn type_info() -> TypeInfo {
        TypeInfo::map::<Self>()
    }
}

impl Reflect for HashMap<String, Vec<String>> {
    fn type_info() -> TypeInfo {
        TypeInfo::multi_value_map::<Self>()
    }
}

impl Reflect for serde_json::Value {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Self>()
    }
}

impl Reflect for http::Method {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Self>()
    }
}

impl Reflect for http::Uri {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Self>()
    }
}

impl Reflect for http::Version {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Self>()
    }
}

impl Reflect for http::HeaderMap {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Payload {
        name: String,
    }

    #[test]
    fn test_simple_types() {
        assert!(TypeInfo::of::<String>().is_simple());
        assert!(TypeInfo::of::<Option<i32>>().is_simple());
        assert!(TypeInfo::of::<Vec<u64>>().is_simple());
        assert!(!TypeInfo::of::<HashMap<String, String>>().is_simple());
        assert!(!TypeInfo::opaque::<Payload>().is_simple());
    }

    #[test]
    fn test_map_types() {
        assert!(TypeInfo::of::<HashMap<String, String>>().is_map());
        assert!(!TypeInfo::of::<HashMap<String, String>>().is_multi_value_map());
        assert!(TypeInfo::of::<Option<HashMap<String, Vec<String>>>>().is_multi_value_map());
        assert!(!TypeInfo::of::<String>().is_map());
    }

    #[test]
    fn test_equality_by_type_id() {
        let a = TypeInfo::of::<String>();
        let b = TypeInfo::opaque::<String>();
        assert_eq!(a, b);
        assert_ne!(a, TypeInfo::of::<i32>());
    }

    #[test]
    fn test_assignability() {
        struct Base;
        struct Derived;

        let base = TypeInfo::opaque::<Base>();
        let derived = TypeInfo::opaque::<Derived>().with_assignable_to::<Base>();

        assert!(base.is_assignable_from(&derived));
        assert!(!derived.is_assignable_from(&base));
        assert!(base.is_assignable_from(&base));
    }

    #[test]
    fn test_body_decoder() {
        let info = TypeInfo::deserializable::<Payload>();
        let decoder = info.body_decoder().unwrap();

        let value = decoder(BodyFormat::Json, br#"{"name":"chimera"}"#).unwrap();
        assert_eq!(
            *value.downcast::<Payload>().unwrap(),
            Payload { name: "chimera".to_string() }
        );

        let value = decoder(BodyFormat::UrlEncoded, b"name=form").unwrap();
        assert_eq!(value.downcast_ref::<Payload>().unwrap().name, "form");

        assert!(decoder(BodyFormat::Json, b"not json").is_err());
    }

    #[test]
    fn test_non_bean_has_no_properties() {
        assert!(TypeInfo::of::<String>().property_descriptors().unwrap().is_empty());
    }
}
