//! 上传流程 - 流程层
//!
//! 核心职责：按文档类型编排一次完整的用户操作
//!
//! 流程顺序：
//! 1. 选择文件（校验类型和大小）
//! 2. 上传 → 创建会话
//! 3. 并发下载全部产物 → 预览就绪
//! 4. 关闭 / 取消 / 销毁 → 撤销本地 URL 并删除服务端会话

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, FlowError};
use crate::models::{CoverLetterDetails, DocumentKind, Session, UploadFile, UploadRequest};
use crate::session::{PreviewStore, SessionManager};
use crate::workflow::FlowState;

/// 上传流程控制器
///
/// - 同一时刻只接受一个文件
/// - 有请求进行中时拒绝再次提交
/// - 所有错误都让状态回到 `FileSelected` 并记录提示信息
/// - 被丢弃时由内部的 `SessionGuard` 负责清理
pub struct UploadFlow {
    manager: SessionManager,
    state: FlowState,
    pending_file: Option<UploadFile>,
    details: Option<CoverLetterDetails>,
    accepted_media_type: String,
    max_upload_bytes: u64,
    last_error: Option<String>,
}

impl UploadFlow {
    /// 创建新的上传流程
    pub fn new(manager: SessionManager, config: &Config) -> Self {
        Self {
            manager,
            state: FlowState::Idle,
            pending_file: None,
            details: None,
            accepted_media_type: config.accepted_media_type.clone(),
            max_upload_bytes: config.max_upload_bytes,
            last_error: None,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.manager.kind()
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// 最近一次失败的提示信息
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn pending_file(&self) -> Option<&UploadFile> {
        self.pending_file.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.manager.active_session()
    }

    pub fn store(&self) -> Option<&PreviewStore> {
        self.manager.store()
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// 提交按钮是否可用
    pub fn can_submit(&self) -> bool {
        self.pending_file.is_some() && !self.state.is_in_flight()
    }

    /// 选择待上传文件，只在 Idle / FileSelected 状态下允许
    pub fn select_file(&mut self, file: UploadFile) -> AppResult<()> {
        if !self.state.accepts_file() {
            return Err(FlowError::InvalidTransition {
                state: self.state,
                action: "选择文件",
            }
            .into());
        }

        if let Err(e) = file.validate(&self.accepted_media_type, self.max_upload_bytes) {
            self.last_error = Some(e.to_string());
            return Err(e.into());
        }

        info!("📄 已选择文件: {} ({} 字节)", file.file_name, file.size());
        self.pending_file = Some(file);
        self.last_error = None;
        self.state = FlowState::FileSelected;
        Ok(())
    }

    /// 移除待上传文件
    pub fn clear_file(&mut self) -> AppResult<()> {
        if !self.state.accepts_file() {
            return Err(FlowError::InvalidTransition {
                state: self.state,
                action: "移除文件",
            }
            .into());
        }
        self.pending_file = None;
        self.last_error = None;
        self.state = FlowState::Idle;
        Ok(())
    }

    /// 设置职位信息，仅求职信流程可用
    pub fn set_details(&mut self, details: CoverLetterDetails) -> AppResult<()> {
        if !self.kind().accepts_details() {
            return Err(FlowError::DetailsNotSupported { kind: self.kind() }.into());
        }
        self.details = Some(details);
        Ok(())
    }

    /// 上传并下载全部产物
    ///
    /// 成功后状态为 `PreviewReady`。在 `PreviewReady` 状态下再次提交会先关闭旧会话。
    pub async fn submit(&mut self) -> AppResult<()> {
        if self.state.is_in_flight() {
            return Err(FlowError::UploadInFlight.into());
        }
        let file = self.pending_file.clone().ok_or(FlowError::NoFileSelected)?;

        let mut request = UploadRequest::new(file);
        if self.kind().accepts_details() {
            if let Some(details) = &self.details {
                request = request.with_details(details.clone());
            }
        }

        self.state = FlowState::Uploading;
        if let Err(e) = self.manager.start_session(&request).await {
            return Err(self.fail(e));
        }

        self.state = FlowState::AwaitingArtifacts;
        if let Err(e) = self.manager.load_artifacts().await {
            return Err(self.fail(e));
        }

        self.state = FlowState::PreviewReady;
        self.last_error = None;
        Ok(())
    }

    /// 获取产物预览图（只有求职信流程有）
    pub async fn preview_images(&self, artifact_name: &str) -> Vec<String> {
        if self.state != FlowState::PreviewReady {
            return Vec::new();
        }
        self.manager.preview_images(artifact_name).await
    }

    /// 关闭预览，PreviewReady → Idle
    pub async fn close(&mut self) -> AppResult<()> {
        if self.state != FlowState::PreviewReady {
            return Err(FlowError::InvalidTransition {
                state: self.state,
                action: "关闭预览",
            }
            .into());
        }
        self.manager.close_session().await;
        self.pending_file = None;
        self.state = FlowState::Idle;
        Ok(())
    }

    /// 放弃一次被中断的提交（例如提交的 future 被丢弃），回到 FileSelected
    pub async fn cancel(&mut self) {
        if !self.state.is_in_flight() {
            return;
        }
        warn!("⚠️ 取消进行中的上传 ({})", self.state);
        self.manager.close_session().await;
        self.state = if self.pending_file.is_some() {
            FlowState::FileSelected
        } else {
            FlowState::Idle
        };
    }

    /// 销毁流程：任意状态下关闭已打开的会话并回到 Idle
    pub async fn teardown(&mut self) {
        if self.state != FlowState::Idle || self.manager.active().is_some() {
            info!("🧹 销毁 {} 流程 (状态: {})", self.kind(), self.state);
        }
        self.manager.close_session().await;
        self.pending_file = None;
        self.details = None;
        self.last_error = None;
        self.state = FlowState::Idle;
    }

    fn fail(&mut self, err: AppError) -> AppError {
        warn!("❌ {} 流程失败 ({}): {}", self.kind(), self.state, err);
        self.last_error = Some(err.to_string());
        self.state = FlowState::FileSelected;
        err
    }
}
