//! Multipart/form-data 支持
//!
//! 基于 multer 解析已缓冲的请求体，每个请求最多解析一次

use std::collections::HashMap;

use bytes::Bytes;
use chimera_bind::{ConversionError, FromPropertyValue, PropertyValue, Reflect, TypeInfo};
use multer::{Constraints, Field, Multipart as MulterMultipart};

/// 上传文件信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartFile {
    /// 字段名称
    pub field_name: String,

    /// 原始文件名（如果提供）
    pub filename: Option<String>,

    /// 文件内容类型（如果提供）
    pub content_type: Option<String>,

    /// 文件数据
    pub data: Bytes,
}

impl MultipartFile {
    /// 从 Field 创建 MultipartFile
    pub async fn from_field(field: Field<'_>) -> Result<Self, multer::Error> {
        let field_name = field.name().unwrap_or("unknown").to_string();
        let filename = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|mime| mime.to_string());
        let data = field.bytes().await?;

        Ok(Self {
            field_name,
            filename,
            content_type,
            data,
        })
    }

    /// 获取文件大小（字节）
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 判断是否为空文件
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 获取文件扩展名
    pub fn extension(&self) -> Option<&str> {
        self.filename
            .as_ref()
            .and_then(|name| name.rfind('.').map(|pos| &name[pos + 1..]))
    }

    /// 获取文件数据的字节切片
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Reflect for MultipartFile {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<MultipartFile>()
    }
}

impl FromPropertyValue for MultipartFile {
    fn from_property_value(value: PropertyValue) -> Result<Self, ConversionError> {
        value.downcast()
    }
}

/// multipart 中的一个部分
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    /// 普通表单字段
    Text(String),
    /// 文件
    File(MultipartFile),
}

/// 解析后的 multipart 数据，按字段名分组并保持出现顺序
#[derive(Debug, Clone, Default)]
pub struct MultipartData {
    parts: HashMap<String, Vec<MultipartPart>>,
}

impl MultipartData {
    /// 解析 multipart 请求体
    pub async fn parse(
        body: Bytes,
        content_type: &str,
        constraints: Constraints,
    ) -> Result<Self, multer::Error> {
        let boundary = multer::parse_boundary(content_type)?;
        let mut multipart = MulterMultipart::with_constraints(
            futures_util::stream::once(async move { Ok::<Bytes, std::io::Error>(body) }),
            boundary,
            constraints,
        );

        let mut parts: HashMap<String, Vec<MultipartPart>> = HashMap::new();
        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or("unknown").to_string();

            let part = if field.file_name().is_some() {
                MultipartPart::File(MultipartFile::from_field(field).await?)
            } else {
                MultipartPart::Text(field.text().await?)
            };
            parts.entry(field_name).or_default().push(part);
        }

        tracing::debug!(fields = parts.len(), "Parsed multipart request body");
        Ok(Self { parts })
    }

    /// 指定字段的所有部分
    pub fn parts(&self, name: &str) -> &[MultipartPart] {
        self.parts.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 指定字段的第一个文件
    pub fn file(&self, name: &str) -> Option<&MultipartFile> {
        self.files(name).next()
    }

    pub fn files<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a MultipartFile> + 'a {
        self.parts(name).iter().filter_map(|part| match part {
            MultipartPart::File(file) => Some(file),
            MultipartPart::Text(_) => None,
        })
    }

    /// 所有普通表单字段（多值）
    pub fn text_fields(&self) -> HashMap<String, Vec<String>> {
        self.parts
            .iter()
            .filter_map(|(name, parts)| {
                let values: Vec<String> = parts
                    .iter()
                    .filter_map(|part| match part {
                        MultipartPart::Text(text) => Some(text.clone()),
                        MultipartPart::File(_) => None,
                    })
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some((name.clone(), values))
                }
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BOUNDARY: &str = "X-CHIMERA-BOUNDARY";

    /// 构造 multipart 请求体：`(字段名, 文件名, 内容)`
    pub(crate) fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n",
                    name, filename
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    pub(crate) fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    #[tokio::test]
    async fn test_parse_fields_and_files() {
        let body = multipart_body(&[
            ("title", None, "hello"),
            ("tag", None, "a"),
            ("tag", None, "b"),
            ("doc", Some("notes.txt"), "file content"),
        ]);

        let data = MultipartData::parse(Bytes::from(body), &content_type(), Constraints::new())
            .await
            .unwrap();

        assert_eq!(data.parts("title"), &[MultipartPart::Text("hello".to_string())]);
        assert_eq!(data.parts("tag").len(), 2);
        assert!(data.parts("missing").is_empty());

        let file = data.file("doc").unwrap();
        assert_eq!(file.filename.as_deref(), Some("notes.txt"));
        assert_eq!(file.extension(), Some("txt"));
        assert_eq!(file.bytes(), b"file content");
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));

        let fields = data.text_fields();
        assert_eq!(fields.get("tag"), Some(&vec!["a".to_string(), "b".to_string()]));
        assert!(!fields.contains_key("doc"));
    }

    #[tokio::test]
    async fn test_missing_boundary() {
        let result = MultipartData::parse(Bytes::new(), "multipart/form-data", Constraints::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_truncated_body() {
        let body = format!("--{}\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue", BOUNDARY);
        let result = MultipartData::parse(Bytes::from(body), &content_type(), Constraints::new()).await;
        assert!(result.is_err());
    }
}
