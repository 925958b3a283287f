//! 请求 Locale
//!
//! 从 `Accept-Language` 中选取权重最高的语言标签，没有时使用配置的默认值。

use std::fmt;
use std::str::FromStr;

use chimera_bind::{ConversionError, FromPropertyValue, PropertyValue, Reflect, TypeInfo};

/// 语言区域，例如 `zh-CN`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    pub fn new(language: impl Into<String>, region: Option<String>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            region: region.map(|r| r.to_uppercase()),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// 解析 `Accept-Language` 请求头，返回权重最高的语言（同权重取先出现的）
    pub fn from_accept_language(header: &str) -> Option<Locale> {
        let mut best: Option<(f32, Locale)> = None;

        for item in header.split(',') {
            let mut parts = item.split(';');
            let tag = parts.next().unwrap_or("").trim();
            if tag.is_empty() || tag == "*" {
                continue;
            }

            let quality = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if quality <= 0.0 {
                continue;
            }

            let Ok(locale) = tag.parse::<Locale>() else {
                continue;
            };
            if best.as_ref().map_or(true, |(q, _)| quality > *q) {
                best = Some((quality, locale));
            }
        }

        best.map(|(_, locale)| locale)
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.trim().split(['-', '_']);
        let language = segments.next().unwrap_or("");
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("Invalid locale: {}", s));
        }
        let region = segments.next().filter(|r| !r.is_empty()).map(str::to_string);
        Ok(Locale::new(language, region))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

impl Reflect for Locale {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Locale>()
    }
}

impl FromPropertyValue for Locale {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        match value {
            PropertyValue::Text(s) => s.parse().map_err(|reason| ConversionError::Parse {
                found: "String",
                required: "Locale",
                reason,
            }),
            other => other.downcast(),
        }
    }
}
