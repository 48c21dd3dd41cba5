#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use resume_flow::error::TransportError;
use resume_flow::{
    Config, CoverLetterDetails, DocumentKind, ProcessingApi, RawResponse, SessionId, UploadFile,
    UploadRequest,
};
use serde_json::{json, Value};

/// 按脚本返回响应的处理服务，并记录所有调用
#[derive(Default)]
pub struct FakeProcessingApi {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    upload_responses: VecDeque<RawResponse>,
    downloads: HashMap<String, RawResponse>,
    images: Option<RawResponse>,
    hang_uploads: bool,
    hang_downloads: bool,
    hang_images: bool,
    fail_deletes: bool,
    delete_delay: Option<Duration>,

    uploads: Vec<(DocumentKind, String, Option<CoverLetterDetails>)>,
    download_calls: Vec<(String, String)>,
    created: Vec<String>,
    deleted: Vec<String>,
}

impl FakeProcessingApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_upload(&self, status: u16, body: Value) {
        self.state.lock().upload_responses.push_back(RawResponse::new(
            status,
            Some("application/json"),
            body.to_string(),
        ));
    }

    pub fn set_download(&self, filename: &str, status: u16, content_type: &str, body: &[u8]) {
        self.state.lock().downloads.insert(
            filename.to_string(),
            RawResponse::new(status, Some(content_type), body.to_vec()),
        );
    }

    pub fn set_pdf(&self, filename: &str) {
        let body = format!("%PDF-1.7 {}", filename);
        self.set_download(filename, 200, "application/pdf", body.as_bytes());
    }

    pub fn set_images(&self, body: Value) {
        let response = RawResponse::new(200, Some("application/json"), body.to_string());
        self.state.lock().images = Some(response);
    }

    pub fn hang_uploads(&self) {
        self.state.lock().hang_uploads = true;
    }

    pub fn hang_downloads(&self) {
        self.state.lock().hang_downloads = true;
    }

    pub fn hang_images(&self) {
        self.state.lock().hang_images = true;
    }

    pub fn fail_deletes(&self) {
        self.state.lock().fail_deletes = true;
    }

    /// 删除请求在记录之前先等待一段时间
    pub fn slow_deletes(&self, delay: Duration) {
        self.state.lock().delete_delay = Some(delay);
    }

    pub fn upload_count(&self) -> usize {
        self.state.lock().uploads.len()
    }

    pub fn last_upload_details(&self) -> Option<CoverLetterDetails> {
        self.state.lock().uploads.last().and_then(|(_, _, d)| d.clone())
    }

    pub fn download_count(&self) -> usize {
        self.state.lock().download_calls.len()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().deleted.clone()
    }

    /// 服务端视角下尚未删除的会话
    pub fn open_sessions(&self) -> Vec<String> {
        let state = self.state.lock();
        let deleted: HashSet<_> = state.deleted.iter().collect();
        state
            .created
            .iter()
            .filter(|id| !deleted.contains(id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProcessingApi for FakeProcessingApi {
    async fn upload(
        &self,
        kind: DocumentKind,
        request: &UploadRequest,
    ) -> Result<RawResponse, TransportError> {
        let (hang, response) = {
            let mut state = self.state.lock();
            state
                .uploads
                .push((kind, request.file.file_name.clone(), request.details.clone()));
            (state.hang_uploads, state.upload_responses.pop_front())
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let response = response.ok_or_else(|| TransportError::new("connection refused"))?;
        if response.is_success() {
            if let Ok(body) = serde_json::from_slice::<Value>(&response.body) {
                if let Some(id) = body.get("session_id").and_then(|v| v.as_str()) {
                    self.state.lock().created.push(id.to_string());
                }
            }
        }
        Ok(response)
    }

    async fn download(
        &self,
        _kind: DocumentKind,
        session_id: &SessionId,
        filename: &str,
    ) -> Result<RawResponse, TransportError> {
        let (hang, response) = {
            let mut state = self.state.lock();
            state
                .download_calls
                .push((session_id.to_string(), filename.to_string()));
            (state.hang_downloads, state.downloads.get(filename).cloned())
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(response.unwrap_or_else(|| RawResponse::new(404, Some("application/json"), "{}")))
    }

    async fn preview_images(
        &self,
        _kind: DocumentKind,
        _session_id: &SessionId,
        _filename: &str,
    ) -> Result<RawResponse, TransportError> {
        let (hang, response) = {
            let state = self.state.lock();
            (state.hang_images, state.images.clone())
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(response.unwrap_or_else(|| RawResponse::new(404, None, "")))
    }

    async fn delete_session(
        &self,
        _kind: DocumentKind,
        session_id: &SessionId,
    ) -> Result<RawResponse, TransportError> {
        let delay = self.state.lock().delete_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if state.fail_deletes {
            return Err(TransportError::new("connection reset"));
        }
        state.deleted.push(session_id.to_string());
        Ok(RawResponse::new(200, Some("application/json"), "{}"))
    }
}

pub fn cv_upload_body(session_id: &str) -> Value {
    json!({
        "session_id": session_id,
        "classic_resume_url": "classic.pdf",
        "modern_resume_url": "modern.pdf",
        "email": "jane@example.com",
        "phone": "+1 555 0100"
    })
}

pub fn cover_upload_body(session_id: &str) -> Value {
    json!({
        "session_id": session_id,
        "cover_letter_filename": "cover_letter.pdf"
    })
}

pub fn test_config() -> Config {
    Config {
        processing_base_url: "http://fake.invalid".to_string(),
        request_timeout_secs: 60,
        ..Config::default()
    }
}

pub fn pdf_file(size: usize) -> UploadFile {
    UploadFile::new("resume.pdf", "application/pdf", vec![b'%'; size])
}

/// 让后台任务（例如 Drop 中发起的删除）有机会运行
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
