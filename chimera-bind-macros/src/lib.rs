mod attribute_helpers;
mod request_bean_impl;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// RequestBean 派生宏
///
/// 为结构体生成 `Reflect`、`RequestBean` 和 `PropertyAccessor` 实现。
/// 每个具名字段都是一个属性，字段上的属性宏决定数据来源：
///
/// ```ignore
/// #[derive(Default, RequestBean)]
/// #[request_bean]                        // 可选：启动时扫描预热
/// struct OrderQuery {
///     #[request_parameter("status")]     // 查询参数
///     status: Vec<String>,
///
///     #[request_parameter]               // 不带名称 + Map 类型：全部查询参数
///     all: HashMap<String, String>,
///
///     #[path_parameter("id")]
///     id: u64,
///
///     #[header_parameter("x-tenant")]
///     tenant: Option<String>,
///
///     #[cookie_parameter("session_id")]
///     session_id: Option<String>,
///
///     #[form_parameter("avatar")]        // urlencoded 或 multipart 字段
///     avatar: Option<MultipartFile>,
///
///     #[session_parameter("user")]     // 需要实现 Deserialize
///     user: Option<User>,
///
///     #[request_context]                 // Method、Uri、Locale、Session 等
///     method: Option<Method>,
///
///     #[request_body]                    // 需要实现 Deserialize
///     payload: Option<Payload>,
///
///     #[bean_parameter]                  // 嵌套 Bean，属性路径为 paging.xxx
///     paging: Paging,
///
///     #[request_annotation("Tenant")]    // 自定义注解，配合自定义解析器
///     custom: String,
/// }
/// ```
///
/// `#[bean_parameter]` 不能与数据来源属性同时使用。
///
/// 没有标注数据来源的字段仍会被自省，但不会被任何内置解析器处理。
#[proc_macro_derive(
    RequestBean,
    attributes(
        request_bean,
        request_parameter,
        form_parameter,
        path_parameter,
        cookie_parameter,
        header_parameter,
        session_parameter,
        request_body,
        request_context,
        bean_parameter,
        request_annotation
    )
)]
#[proc_macro_error]
pub fn derive_request_bean(input: TokenStream) -> TokenStream {
    request_bean_impl::derive_request_bean_impl(input)
}
