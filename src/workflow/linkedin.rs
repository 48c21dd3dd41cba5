//! LinkedIn 资料优化
//!
//! 一次上传直接返回生成的资料，不产生服务端会话

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::clients::ProcessingApi;
use crate::config::Config;
use crate::error::{AppError, AppResult, UploadError};
use crate::models::{DocumentKind, LinkedInProfile, UploadFile, UploadRequest};
use crate::session::manager::bounded;

pub struct LinkedInFlow {
    api: Arc<dyn ProcessingApi>,
    request_timeout: Duration,
    accepted_media_type: String,
    max_upload_bytes: u64,
}

impl LinkedInFlow {
    pub fn new(api: Arc<dyn ProcessingApi>, config: &Config) -> Self {
        Self {
            api,
            request_timeout: config.request_timeout(),
            accepted_media_type: config.accepted_media_type.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// 上传简历并返回优化后的 LinkedIn 资料
    pub async fn optimize(&self, file: UploadFile) -> AppResult<LinkedInProfile> {
        file.validate(&self.accepted_media_type, self.max_upload_bytes)?;

        let kind = DocumentKind::LinkedIn;
        let endpoint = kind.upload_path();
        let request = UploadRequest::new(file);

        let response = bounded(self.request_timeout, self.api.upload(kind, &request))
            .await
            .map_err(|e| AppError::upload_request_failed(endpoint, e))?;

        if !response.is_success() {
            return Err(UploadError::Rejected {
                endpoint: endpoint.to_string(),
                status: response.status,
            }
            .into());
        }

        let profile = LinkedInProfile::from_body(endpoint, &response.body)?;
        info!("✓ LinkedIn 资料已生成: {}", profile.tag_line);
        Ok(profile)
    }
}
