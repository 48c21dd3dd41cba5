/// 文档处理服务客户端
///
/// 封装上传、下载、预览图和删除会话四个接口。
/// 这里只负责收发 HTTP，状态码和 Content-Type 的判断交给会话管理层。
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, TransportError};
use crate::models::{DocumentKind, SessionId, UploadRequest};

/// 未经解释的 HTTP 响应
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content-Type 是否包含期望的类型（忽略 charset 等参数和大小写）
    pub fn has_content_type(&self, expected: &str) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains(&expected.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

/// 文档处理服务
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// 上传文件（求职信流程附带职位信息）
    async fn upload(
        &self,
        kind: DocumentKind,
        request: &UploadRequest,
    ) -> Result<RawResponse, TransportError>;

    /// 下载会话中的某个产物
    async fn download(
        &self,
        kind: DocumentKind,
        session_id: &SessionId,
        filename: &str,
    ) -> Result<RawResponse, TransportError>;

    /// 获取产物的分页预览图
    async fn preview_images(
        &self,
        kind: DocumentKind,
        session_id: &SessionId,
        filename: &str,
    ) -> Result<RawResponse, TransportError>;

    /// 删除服务端会话
    async fn delete_session(
        &self,
        kind: DocumentKind,
        session_id: &SessionId,
    ) -> Result<RawResponse, TransportError>;
}

/// 基于 reqwest 的实现
pub struct HttpProcessingClient {
    client: Client,
    base_url: String,
}

impl HttpProcessingClient {
    /// 创建新的处理服务客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Config(ConfigError::HttpClient { source: e }))?;

        Ok(Self {
            client,
            base_url: config.processing_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 服务部署在 ngrok 后面时需要跳过浏览器警告页
    fn decorate(builder: RequestBuilder) -> RequestBuilder {
        builder.header("ngrok-skip-browser-warning", "true")
    }

    fn require(
        path: Option<&'static str>,
        kind: DocumentKind,
        what: &str,
    ) -> Result<&'static str, TransportError> {
        path.ok_or_else(|| TransportError::new(format!("{} 流程没有{}接口", kind, what)))
    }
}

#[async_trait]
impl ProcessingApi for HttpProcessingClient {
    async fn upload(
        &self,
        kind: DocumentKind,
        request: &UploadRequest,
    ) -> Result<RawResponse, TransportError> {
        let file = &request.file;
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)?;

        let mut form = Form::new().part("file", part);
        if kind.accepts_details() {
            if let Some(details) = &request.details {
                for (name, value) in details.fields() {
                    form = form.text(name, value.to_string());
                }
            }
        }

        let url = self.url(kind.upload_path());
        debug!("上传 {} ({} 字节) -> {}", file.file_name, file.size(), url);

        let response = Self::decorate(self.client.post(&url))
            .header(header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        into_raw(response).await
    }

    async fn download(
        &self,
        kind: DocumentKind,
        session_id: &SessionId,
        filename: &str,
    ) -> Result<RawResponse, TransportError> {
        let path = Self::require(kind.download_path(), kind, "下载")?;
        debug!("下载产物: session={} filename={}", session_id, filename);

        let response = Self::decorate(self.client.get(self.url(path)))
            .query(&[("session_id", session_id.as_str()), ("filename", filename)])
            .header(header::ACCEPT, "application/pdf")
            .send()
            .await?;

        into_raw(response).await
    }

    async fn preview_images(
        &self,
        kind: DocumentKind,
        session_id: &SessionId,
        filename: &str,
    ) -> Result<RawResponse, TransportError> {
        let path = Self::require(kind.images_path(), kind, "预览图")?;
        let payload = json!({
            "session_id": session_id.as_str(),
            "filename": filename
        });

        let response = Self::decorate(self.client.post(self.url(path)))
            .json(&payload)
            .send()
            .await?;

        into_raw(response).await
    }

    async fn delete_session(
        &self,
        kind: DocumentKind,
        session_id: &SessionId,
    ) -> Result<RawResponse, TransportError> {
        let path = Self::require(kind.delete_session_path(), kind, "删除会话")?;
        debug!("删除会话: {}", session_id);

        let response = Self::decorate(self.client.delete(self.url(path)))
            .query(&[("session_id", session_id.as_str())])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        into_raw(response).await
    }
}

async fn into_raw(response: Response) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await?;

    Ok(RawResponse {
        status,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_match_ignores_parameters_and_case() {
        let raw = RawResponse::new(200, Some("Application/PDF; charset=binary"), Vec::new());
        assert!(raw.has_content_type("application/pdf"));
        assert!(!RawResponse::new(200, Some("text/html"), Vec::new())
            .has_content_type("application/pdf"));
        assert!(!RawResponse::new(200, None, Vec::new()).has_content_type("application/pdf"));
    }

    #[test]
    fn test_success_range() {
        assert!(RawResponse::new(204, None, Vec::new()).is_success());
        assert!(!RawResponse::new(422, None, Vec::new()).is_success());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = Config {
            processing_base_url: "http://localhost:8000/".to_string(),
            ..Config::default()
        };
        let client = HttpProcessingClient::new(&config).unwrap();
        assert_eq!(client.url("/cover/images"), "http://localhost:8000/cover/images");
    }
}
