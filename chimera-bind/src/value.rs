//! 请求值与类型转换
//!
//! 解析器产出 `PropertyValue`，绑定器通过 `FromPropertyValue` 把它转换成属性的声明类型。
//! 转换规则与常见 Web 框架一致：
//!
//! - 多值转单个字符串时用逗号拼接
//! - 只有一个元素的多值可以解析为标量
//! - 字符串转集合时按逗号拆分
//! - 空字符串（或元素全为空的多值）转 `Option<T>` 得到 `None`

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::error::ConversionError;

/// 解析器产出的请求值
pub enum PropertyValue {
    /// 单个字符串
    Text(String),
    /// 多个字符串（同名参数、同名请求头等）
    List(Vec<String>),
    /// 单值 Map
    Map(HashMap<String, String>),
    /// 多值 Map
    MultiMap(HashMap<String, Vec<String>>),
    /// JSON 值（例如 Session 属性）
    Json(serde_json::Value),
    /// 任意对象（请求体、上传文件、请求上下文对象）
    Object(Box<dyn Any + Send + Sync>),
}

impl PropertyValue {
    pub fn text(value: impl Into<String>) -> Self {
        PropertyValue::Text(value.into())
    }

    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        PropertyValue::Object(Box::new(value))
    }

    /// 值类型名称，用于错误信息
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "String",
            PropertyValue::List(_) => "String[]",
            PropertyValue::Map(_) => "Map",
            PropertyValue::MultiMap(_) => "MultiValueMap",
            PropertyValue::Json(_) => "Json",
            PropertyValue::Object(_) => "Object",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 取出对象值
    pub fn downcast<T: Any>(self) -> Result<T, ConversionError> {
        let found = self.type_name();
        match self {
            PropertyValue::Object(value) => value
                .downcast::<T>()
                .map(|value| *value)
                .map_err(|_| ConversionError::Unsupported {
                    found,
                    required: std::any::type_name::<T>(),
                }),
            _ => Err(ConversionError::Unsupported {
                found,
                required: std::any::type_name::<T>(),
            }),
        }
    }

    /// 转换为目标类型
    pub fn convert<T: FromPropertyValue>(self) -> Result<T, ConversionError> {
        T::from_property_value(self)
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            PropertyValue::List(v) => f.debug_tuple("List").field(v).finish(),
            PropertyValue::Map(m) => f.debug_tuple("Map").field(m).finish(),
            PropertyValue::MultiMap(m) => f.debug_tuple("MultiMap").field(m).finish(),
            PropertyValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
            PropertyValue::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value)
    }
}

/// 按顺序暂存的属性值，键为点分隔的属性路径
#[derive(Debug, Default)]
pub struct PropertyValues {
    values: Vec<(String, PropertyValue)>,
}

impl PropertyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个值，同一路径重复添加时替换旧值
    pub fn add(&mut self, path: impl Into<String>, value: PropertyValue) {
        let path = path.into();
        match self.values.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = value,
            None => self.values.push((path, value)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&PropertyValue> {
        self.values.iter().find(|(p, _)| p == path).map(|(_, v)| v)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl IntoIterator for PropertyValues {
    type Item = (String, PropertyValue);
    type IntoIter = std::vec::IntoIter<(String, PropertyValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// 从请求值转换
pub trait FromPropertyValue: Sized {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError>;
}

fn unsupported<T>(value: &PropertyValue) -> ConversionError {
    ConversionError::Unsupported {
        found: value.type_name(),
        required: std::any::type_name::<T>(),
    }
}

/// 通过 serde 把请求值反序列化为任意类型（Session 属性等 JSON 来源）
pub fn deserialize_value<T: DeserializeOwned>(value: PropertyValue) -> Result<T, ConversionError> {
    let found = value.type_name();
    let json = serde_json::Value::from_property_value(value)?;
    serde_json::from_value(json).map_err(|e| ConversionError::Parse {
        found,
        required: std::any::type_name::<T>(),
        reason: e.to_string(),
    })
}

/// 取出单个文本，多值只接受一个元素
fn single_text<T>(value: PropertyValue) -> Result<String, ConversionError> {
    match value {
        PropertyValue::Text(s) => Ok(s),
        PropertyValue::List(mut items) if items.len() == 1 => Ok(items.remove(0)),
        PropertyValue::Json(serde_json::Value::String(s)) => Ok(s),
        PropertyValue::Json(serde_json::Value::Number(n)) => Ok(n.to_string()),
        PropertyValue::Json(serde_json::Value::Bool(b)) => Ok(b.to_string()),
        other => Err(unsupported::<T>(&other)),
    }
}

fn parse_text<T>(found: &'static str, text: &str) -> Result<T, ConversionError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    text.trim().parse::<T>().map_err(|e| ConversionError::Parse {
        found,
        required: std::any::type_name::<T>(),
        reason: e.to_string(),
    })
}

macro_rules! impl_from_str_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromPropertyValue for $ty {
                fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
                    let found = value.type_name();
                    let text = single_text::<$ty>(value)?;
                    parse_text::<$ty>(found, &text)
                }
            }
        )*
    };
}

impl_from_str_value!(char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl FromPropertyValue for bool {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        let found = value.type_name();
        let text = single_text::<bool>(value)?;
        match text.trim().to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(true),
            "false" | "off" | "no" | "0" => Ok(false),
            other => Err(ConversionError::Parse {
                found,
                required: "bool",
                reason: format!("Invalid boolean value [{}]", other),
            }),
        }
    }
}

impl FromPropertyValue for String {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        match value {
            PropertyValue::Text(s) => Ok(s),
            PropertyValue::List(items) => Ok(items.join(",")),
            PropertyValue::Json(serde_json::Value::String(s)) => Ok(s),
            PropertyValue::Json(v @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
                Ok(v.to_string())
            }
            other => Err(unsupported::<String>(&other)),
        }
    }
}

impl<T: FromPropertyValue> FromPropertyValue for Option<T> {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        match value {
            PropertyValue::Text(s) if s.is_empty() => Ok(None),
            PropertyValue::List(items) if items.iter().all(String::is_empty) => Ok(None),
            PropertyValue::Json(serde_json::Value::Null) => Ok(None),
            other => T::from_property_value(other).map(Some),
        }
    }
}

impl<T: FromPropertyValue + 'static> FromPropertyValue for Vec<T> {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        match value {
            PropertyValue::List(items) => items
                .into_iter()
                .map(|item| T::from_property_value(PropertyValue::Text(item)))
                .collect(),
            PropertyValue::Text(s) => s
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| T::from_property_value(PropertyValue::Text(item.to_string())))
                .collect(),
            PropertyValue::Json(serde_json::Value::Array(items)) => items
                .into_iter()
                .map(|item| T::from_property_value(PropertyValue::Json(item)))
                .collect(),
            PropertyValue::Object(object) => match object.downcast::<Vec<T>>() {
                Ok(items) => Ok(*items),
                Err(object) => T::from_property_value(PropertyValue::Object(object)).map(|t| vec![t]),
            },
            other => Err(unsupported::<Vec<T>>(&other)),
        }
    }
}

impl FromPropertyValue for HashMap<String, String> {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        match value {
            PropertyValue::Map(map) => Ok(map),
            PropertyValue::MultiMap(map) => Ok(map
                .into_iter()
                .filter_map(|(k, mut v)| {
                    if v.is_empty() {
                        None
                    } else {
                        Some((k, v.remove(0)))
                    }
                })
                .collect()),
            PropertyValue::Json(serde_json::Value::Object(map)) => Ok(map
                .into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect()),
            other => Err(unsupported::<HashMap<String, String>>(&other)),
        }
    }
}

impl FromPropertyValue for BTreeMap<String, String> {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        HashMap::<String, String>::from_property_value(value).map(|map| map.into_iter().collect())
    }
}

impl FromPropertyValue for HashMap<String, Vec<String>> {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        match value {
            PropertyValue::MultiMap(map) => Ok(map),
            PropertyValue::Map(map) => Ok(map.into_iter().map(|(k, v)| (k, vec![v])).collect()),
            other => Err(unsupported::<HashMap<String, Vec<String>>>(&other)),
        }
    }
}

impl FromPropertyValue for serde_json::Value {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        use serde_json::Value;

        match value {
            PropertyValue::Json(v) => Ok(v),
            PropertyValue::Text(s) => Ok(Value::String(s)),
            PropertyValue::List(items) => Ok(Value::Array(items.into_iter().map(Value::String).collect())),
            PropertyValue::Map(map) => Ok(Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            )),
            PropertyValue::MultiMap(map) => Ok(Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::Array(v.into_iter().map(Value::String).collect())))
                    .collect(),
            )),
            other => other.downcast::<Value>(),
        }
    }
}

impl FromPropertyValue for http::Method {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        match value {
            PropertyValue::Text(s) => {
                http::Method::from_bytes(s.trim().as_bytes()).map_err(|e| ConversionError::Parse {
                    found: "String",
                    required: "http::Method",
                    reason: e.to_string(),
                })
            }
            other => other.downcast(),
        }
    }
}

impl FromPropertyValue for http::Uri {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        match value {
            PropertyValue::Text(s) => parse_text("String", &s),
            other => other.downcast(),
        }
    }
}

impl FromPropertyValue for http::Version {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        value.downcast()
    }
}

impl FromPropertyValue for http::HeaderMap {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        value.downcast()
    }
}
