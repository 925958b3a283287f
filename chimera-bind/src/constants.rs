/// 绑定相关配置键
///
/// 宏、配置加载和 Web 集成共用这些键，避免硬编码不一致

/// 启动时扫描预热的模块路径列表
pub const BIND_PACKAGES_TO_SCAN: &str = "chimera.bind.packages-to-scan";

/// 请求体最大字节数
pub const BIND_MAX_BODY_SIZE: &str = "chimera.bind.max-body-size";

/// multipart 单个文件最大字节数
pub const BIND_MULTIPART_MAX_FILE_SIZE: &str = "chimera.bind.multipart.max-file-size";

/// 请求未携带 Accept-Language 时使用的 Locale
pub const BIND_DEFAULT_LOCALE: &str = "chimera.bind.default-locale";

/// 环境变量前缀，例如 `CHIMERA_BIND_MAX_BODY_SIZE`
pub const ENV_PREFIX: &str = "";

pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

pub const DEFAULT_MULTIPART_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const DEFAULT_LOCALE: &str = "en";

/// 绑定结果中请求 Bean 的默认对象名
pub const DEFAULT_OBJECT_NAME: &str = "target";
