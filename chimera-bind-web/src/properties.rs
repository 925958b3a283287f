//! 绑定配置属性
//!
//! 通过配置文件的 `chimera.bind` 前缀配置：
//!
//! ```toml
//! [chimera.bind]
//! packages-to-scan = ["app::web::requests"]
//! max-body-size = 2097152
//! default-locale = "zh-CN"
//!
//! [chimera.bind.multipart]
//! max-file-size = 10485760
//! ```

use chimera_bind::{
    Environment, BIND_DEFAULT_LOCALE, BIND_MAX_BODY_SIZE, BIND_MULTIPART_MAX_FILE_SIZE,
    BIND_PACKAGES_TO_SCAN, DEFAULT_LOCALE, DEFAULT_MAX_BODY_SIZE, DEFAULT_MULTIPART_MAX_FILE_SIZE,
};
use serde::{Deserialize, Serialize};

/// 绑定配置属性
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinderProperties {
    /// 启动时扫描预热的模块路径
    #[serde(default)]
    pub packages_to_scan: Vec<String>,

    /// 请求体最大字节数，默认 2MB
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// multipart 单个文件最大字节数，默认 10MB
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,

    /// 请求没有 Accept-Language 时使用的 Locale
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_max_file_size() -> usize {
    DEFAULT_MULTIPART_MAX_FILE_SIZE
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for BinderProperties {
    fn default() -> Self {
        Self {
            packages_to_scan: Vec::new(),
            max_body_size: default_max_body_size(),
            max_file_size: default_max_file_size(),
            default_locale: default_locale(),
        }
    }
}

impl BinderProperties {
    /// 从 Environment 加载配置
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            packages_to_scan: env.get_string_array(BIND_PACKAGES_TO_SCAN).unwrap_or_default(),
            max_body_size: env
                .get_i64(BIND_MAX_BODY_SIZE)
                .filter(|v| *v > 0)
                .map(|v| v as usize)
                .unwrap_or_else(default_max_body_size),
            max_file_size: env
                .get_i64(BIND_MULTIPART_MAX_FILE_SIZE)
                .filter(|v| *v > 0)
                .map(|v| v as usize)
                .unwrap_or_else(default_max_file_size),
            default_locale: env
                .get_string(BIND_DEFAULT_LOCALE)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(default_locale),
        }
    }

    /// 转换为 multer::Constraints
    pub fn to_multer_constraints(&self) -> multer::Constraints {
        multer::Constraints::new().size_limit(
            multer::SizeLimit::new()
                .whole_stream(self.max_body_size as u64)
                .per_field(self.max_file_size as u64),
        )
    }
}
