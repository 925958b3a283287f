//! 表单字段解析器
//!
//! 先查找 multipart 数据，再查找 urlencoded 表单数据

use async_trait::async_trait;
use chimera_bind::{AnnotationKind, BindingProperty, PropertyValue, RequestPropertyResolverBase};

use super::{map_value, required_name, supports_named, supports_unnamed_map, RequestPropertyResolver};
use crate::error::ResolveError;
use crate::multipart::{MultipartFile, MultipartPart};
use crate::request::WebRequest;

/// `#[form_parameter("name")]`：表单字段或上传文件
///
/// - 单个部分：文本为 `Text`，文件为 `Object(MultipartFile)`
/// - 多个部分：全是文本时为 `List`，否则为 `Object(Vec<MultipartFile>)`（只保留文件）
pub struct FormParameterRequestPropertyResolver;

impl RequestPropertyResolverBase for FormParameterRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_named(property, AnnotationKind::FormParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for FormParameterRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        let name = required_name(property, AnnotationKind::FormParameter)?;

        if let Some(multipart) = request.multipart_data().await? {
            if let Some(value) = parts_value(multipart.parts(name)) {
                return Ok(Some(value));
            }
        }

        let values = request.form_data().await?.get(name).cloned();
        Ok(values.map(PropertyValue::List))
    }
}

fn parts_value(parts: &[MultipartPart]) -> Option<PropertyValue> {
    match parts {
        [] => None,
        [MultipartPart::Text(text)] => Some(PropertyValue::Text(text.clone())),
        [MultipartPart::File(file)] => Some(PropertyValue::object(file.clone())),
        _ => {
            let files: Vec<MultipartFile> = parts
                .iter()
                .filter_map(|part| match part {
                    MultipartPart::File(file) => Some(file.clone()),
                    MultipartPart::Text(_) => None,
                })
                .collect();
            if files.is_empty() {
                let texts = parts
                    .iter()
                    .filter_map(|part| match part {
                        MultipartPart::Text(text) => Some(text.clone()),
                        MultipartPart::File(_) => None,
                    })
                    .collect();
                Some(PropertyValue::List(texts))
            } else {
                Some(PropertyValue::object(files))
            }
        }
    }
}

/// `#[form_parameter]` 标注在 Map 类型上：全部表单字段（不含文件）
pub struct FormParameterMapRequestPropertyResolver;

impl RequestPropertyResolverBase for FormParameterMapRequestPropertyResolver {
    fn supports(&self, property: &BindingProperty) -> bool {
        supports_unnamed_map(property, AnnotationKind::FormParameter)
    }
}

#[async_trait]
impl RequestPropertyResolver for FormParameterMapRequestPropertyResolver {
    async fn resolve(
        &self,
        property: &BindingProperty,
        request: &WebRequest,
    ) -> Result<Option<PropertyValue>, ResolveError> {
        required_name(property, AnnotationKind::FormParameter)?;

        let mut fields = request.form_data().await?.clone();
        if let Some(multipart) = request.multipart_data().await? {
            for (name, values) in multipart.text_fields() {
                fields.entry(name).or_default().extend(values);
            }
        }
        Ok(Some(map_value(property, fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::tests::{content_type, multipart_body};
    use crate::request::tests::web_request;
    use crate::resolver::tests::property;
    use axum::body::Body;
    use chimera_bind::Annotation;
    use std::collections::HashMap;

    async fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> WebRequest {
        let req = axum::http::Request::builder()
            .method("POST")
            .header("content-type", content_type())
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        web_request(req).await
    }

    #[tokio::test]
    async fn test_urlencoded_field() {
        let resolver = FormParameterRequestPropertyResolver;
        let prop = property::<Vec<String>>("langs", Annotation::named(AnnotationKind::FormParameter, "lang"));
        assert!(resolver.supports(&prop));

        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/?lang=query")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("lang=rust&lang=go"))
            .unwrap();
        let req = web_request(req).await;

        let value = resolver.resolve(&prop, &req).await.unwrap().unwrap();
        assert_eq!(value.convert::<Vec<String>>().unwrap(), vec!["rust", "go"]);
    }

    #[tokio::test]
    async fn test_multipart_text_and_file() {
        let resolver = FormParameterRequestPropertyResolver;
        let req = multipart_request(&[
            ("title", None, "hello"),
            ("avatar", Some("me.png"), "png-bytes"),
            ("docs", Some("a.txt"), "a"),
            ("docs", Some("b.txt"), "b"),
        ])
        .await;

        let title = property::<String>("title", Annotation::named(AnnotationKind::FormParameter, "title"));
        let value = resolver.resolve(&title, &req).await.unwrap().unwrap();
        assert_eq!(value.convert::<String>().unwrap(), "hello");

        let avatar = property::<Option<MultipartFile>>("avatar", Annotation::named(AnnotationKind::FormParameter, "avatar"));
        let value = resolver.resolve(&avatar, &req).await.unwrap().unwrap();
        let file = value.convert::<Option<MultipartFile>>().unwrap().unwrap();
        assert_eq!(file.filename.as_deref(), Some("me.png"));

        let docs = property::<Vec<MultipartFile>>("docs", Annotation::named(AnnotationKind::FormParameter, "docs"));
        let value = resolver.resolve(&docs, &req).await.unwrap().unwrap();
        let files = value.convert::<Vec<MultipartFile>>().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].bytes(), b"b");

        let missing = property::<String>("x", Annotation::named(AnnotationKind::FormParameter, "x"));
        assert!(resolver.resolve(&missing, &req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_multipart() {
        let resolver = FormParameterRequestPropertyResolver;
        let req = axum::http::Request::builder()
            .method("POST")
            .header("content-type", content_type())
            .body(Body::from("not a multipart body"))
            .unwrap();
        let req = web_request(req).await;

        let prop = property::<String>("title", Annotation::named(AnnotationKind::FormParameter, "title"));
        let err = resolver.resolve(&prop, &req).await.unwrap_err();
        assert!(matches!(err, ResolveError::Multipart(_)));
    }

    #[tokio::test]
    async fn test_form_map_includes_multipart_text_fields() {
        let resolver = FormParameterMapRequestPropertyResolver;
        let prop = property::<HashMap<String, Vec<String>>>("form", Annotation::new(AnnotationKind::FormParameter));
        assert!(resolver.supports(&prop));

        let req = multipart_request(&[("a", None, "1"), ("a", None, "2"), ("f", Some("f.txt"), "x")]).await;
        let value = resolver.resolve(&prop, &req).await.unwrap().unwrap();
        let form = value.convert::<HashMap<String, Vec<String>>>().unwrap();
        assert_eq!(form.get("a"), Some(&vec!["1".to_string(), "2".to_string()]));
        assert!(!form.contains_key("f"));
    }
}
