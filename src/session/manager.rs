//! 会话生命周期管理
//!
//! ## 职责
//!
//! - 上传文件并创建服务端会话（[`SessionManager::start_session`]）
//! - 下载会话产物并分配本地 URL（[`SessionManager::fetch_artifact`]）
//! - 关闭会话：先撤销本地 URL，再尽力删除服务端会话（[`SessionManager::close_session`]）
//!
//! ## 不变量
//!
//! 每个管理器同一时刻最多持有一个 [`SessionGuard`]。开启新会话前先关闭旧会话。
//! `SessionGuard` 被丢弃而未关闭时，在 `Drop` 中撤销本地 URL 并在后台发起删除。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use super::object_url::ObjectUrlRegistry;
use super::preview_store::{ArtifactHandle, PreviewStore};
use crate::clients::ProcessingApi;
use crate::config::Config;
use crate::error::{
    AppError, AppResult, DownloadError, FlowError, SessionCleanupError, TransportError, UploadError,
};
use crate::models::{parse_preview_images, DocumentKind, Session, SessionId, UploadRequest};

/// 为任意请求加上时间上限
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::timed_out(limit)),
    }
}

/// 当前打开的会话，唯一所有者
///
/// 本地 URL 的撤销和服务端删除分别记录：关闭的 future 在删除途中被丢弃时，
/// `Drop` 仍会在后台补发删除。
pub struct SessionGuard {
    session: Session,
    store: PreviewStore,
    api: Arc<dyn ProcessingApi>,
    kind: DocumentKind,
    request_timeout: Duration,
    urls_revoked: bool,
    remote_released: bool,
}

impl SessionGuard {
    fn new(
        session: Session,
        api: Arc<dyn ProcessingApi>,
        kind: DocumentKind,
        request_timeout: Duration,
    ) -> Self {
        Self {
            session,
            store: PreviewStore::new(),
            api,
            kind,
            request_timeout,
            urls_revoked: false,
            remote_released: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &PreviewStore {
        &self.store
    }

    /// 本地 URL 已撤销且服务端删除已完成（无论成功与否）
    pub fn is_closed(&self) -> bool {
        self.urls_revoked && self.remote_released
    }

    fn revoke_urls(&mut self) -> usize {
        self.urls_revoked = true;
        self.store.clear()
    }

    /// 关闭会话，可重复调用
    pub async fn close(&mut self) {
        if self.remote_released {
            return;
        }

        let revoked = self.revoke_urls();
        info!(
            "🧹 关闭会话 {} (撤销 {} 个本地 URL)",
            self.session.id, revoked
        );

        delete_remote(
            self.api.clone(),
            self.kind,
            self.session.id.clone(),
            self.request_timeout,
        )
        .await;
        self.remote_released = true;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.revoke_urls();
        if self.remote_released {
            return;
        }
        self.remote_released = true;

        let session_id = self.session.id.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("会话 {} 未完成关闭, 在后台删除", session_id);
                handle.spawn(delete_remote(
                    self.api.clone(),
                    self.kind,
                    session_id,
                    self.request_timeout,
                ));
            }
            Err(_) => {
                warn!("⚠️ 没有可用的异步运行时, 跳过删除服务端会话 {}", session_id);
            }
        }
    }
}

/// 尽力删除服务端会话，失败只记录日志
async fn delete_remote(
    api: Arc<dyn ProcessingApi>,
    kind: DocumentKind,
    session_id: SessionId,
    limit: Duration,
) {
    match try_delete(api.as_ref(), kind, &session_id, limit).await {
        Ok(()) => debug!("✓ 服务端会话 {} 已删除", session_id),
        Err(e) => warn!("⚠️ {}", AppError::from(e)),
    }
}

async fn try_delete(
    api: &dyn ProcessingApi,
    kind: DocumentKind,
    session_id: &SessionId,
    limit: Duration,
) -> Result<(), SessionCleanupError> {
    let response = bounded(limit, api.delete_session(kind, session_id))
        .await
        .map_err(|source| SessionCleanupError::RequestFailed {
            session_id: session_id.clone(),
            source,
        })?;

    if !response.is_success() {
        return Err(SessionCleanupError::Rejected {
            session_id: session_id.clone(),
            status: response.status,
        });
    }
    Ok(())
}

/// 会话生命周期管理器
///
/// 职责：
/// - 持有当前会话（最多一个）
/// - 上传 → 下载产物 → 预览 → 关闭
/// - 不关心界面状态
pub struct SessionManager {
    api: Arc<dyn ProcessingApi>,
    registry: ObjectUrlRegistry,
    kind: DocumentKind,
    request_timeout: Duration,
    expected_media_type: String,
    active: Option<SessionGuard>,
}

impl SessionManager {
    /// 创建新的会话管理器
    pub fn new(api: Arc<dyn ProcessingApi>, kind: DocumentKind, config: &Config) -> Self {
        Self {
            api,
            registry: ObjectUrlRegistry::new(),
            kind,
            request_timeout: config.request_timeout(),
            expected_media_type: config.accepted_media_type.clone(),
            active: None,
        }
    }

    /// 使用外部传入的对象 URL 登记表
    pub fn with_registry(mut self, registry: ObjectUrlRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    pub fn active(&self) -> Option<&SessionGuard> {
        self.active.as_ref()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref().map(|guard| guard.session())
    }

    pub fn store(&self) -> Option<&PreviewStore> {
        self.active.as_ref().map(|guard| guard.store())
    }

    /// 上传文件并开启新会话
    ///
    /// 已有会话时先关闭旧会话。上传失败返回 `UploadError`，
    /// 响应缺少 session_id 或产物文件名返回 `MalformedResponseError`。
    pub async fn start_session(&mut self, request: &UploadRequest) -> AppResult<Session> {
        if !self.kind.has_session() {
            return Err(FlowError::SessionNotSupported { kind: self.kind }.into());
        }

        if let Some(previous) = self.active.as_ref() {
            info!("🔁 新的上传将替换会话 {}", previous.session().id);
            self.close_session().await;
        }

        let endpoint = self.kind.upload_path();
        info!(
            "📤 上传 {} ({:.2} MB)",
            request.file.file_name,
            request.file.size() as f64 / 1024.0 / 1024.0
        );

        let response = bounded(self.request_timeout, self.api.upload(self.kind, request))
            .await
            .map_err(|e| AppError::upload_request_failed(endpoint, e))?;

        if !response.is_success() {
            return Err(UploadError::Rejected {
                endpoint: endpoint.to_string(),
                status: response.status,
            }
            .into());
        }

        let session = Session::from_upload_body(self.kind, &response.body)?;
        info!(
            "✓ 会话已创建: {} ({} 个产物)",
            session.id,
            session.artifacts.len()
        );

        self.active = Some(SessionGuard::new(
            session.clone(),
            self.api.clone(),
            self.kind,
            self.request_timeout,
        ));

        Ok(session)
    }

    /// 下载会话中的一个产物并分配本地 URL
    ///
    /// 只接受当前打开的会话；已关闭或被替换的会话返回 `DownloadError::SessionClosed`。
    pub async fn fetch_artifact(
        &self,
        session: &Session,
        artifact_name: &str,
    ) -> AppResult<ArtifactHandle> {
        let is_live = self
            .active_session()
            .map(|active| active.id == session.id)
            .unwrap_or(false);
        if !is_live {
            return Err(DownloadError::SessionClosed {
                session_id: session.id.clone(),
            }
            .into());
        }

        let artifact = session
            .artifact(artifact_name)
            .ok_or_else(|| DownloadError::UnknownArtifact {
                session_id: session.id.clone(),
                name: artifact_name.to_string(),
            })?;

        let response = bounded(
            self.request_timeout,
            self.api.download(self.kind, &session.id, &artifact.filename),
        )
        .await
        .map_err(|e| AppError::download_request_failed(&artifact.filename, e))?;

        if !response.is_success() {
            return Err(DownloadError::Rejected {
                filename: artifact.filename.clone(),
                status: response.status,
            }
            .into());
        }

        if !response.has_content_type(&self.expected_media_type) {
            return Err(DownloadError::UnexpectedContentType {
                filename: artifact.filename.clone(),
                expected: self.expected_media_type.clone(),
                actual: response.content_type,
            }
            .into());
        }

        debug!(
            "✓ 已下载 {} ({} 字节)",
            artifact.filename,
            response.body.len()
        );

        let local_url = self.registry.create(response.body.clone());
        Ok(ArtifactHandle::new(
            &artifact.name,
            &artifact.filename,
            &self.expected_media_type,
            response.body,
            local_url,
        ))
    }

    /// 并发下载当前会话的全部产物
    ///
    /// 全部成功才写入预览存储；任何一个失败都会关闭会话并返回该错误。
    pub async fn load_artifacts(&mut self) -> AppResult<usize> {
        let session = self
            .active_session()
            .cloned()
            .ok_or(FlowError::NoActiveSession)?;

        let fetches = session
            .artifacts
            .iter()
            .map(|artifact| self.fetch_artifact(&session, &artifact.name));
        let result = try_join_all(fetches).await;

        let handles = match result {
            Ok(handles) => handles,
            Err(e) => {
                warn!("⚠️ 会话 {} 的产物下载失败: {}", session.id, e);
                self.close_session().await;
                return Err(e);
            }
        };

        let count = handles.len();
        let guard = self.active.as_mut().ok_or(FlowError::NoActiveSession)?;
        for handle in handles {
            let name = handle.name.clone();
            guard.store.put(&name, handle);
        }

        info!("✓ 会话 {} 的 {} 个产物已就绪", session.id, count);
        Ok(count)
    }

    /// 获取产物的预览图；接口失败或超时返回空列表
    pub async fn preview_images(&self, artifact_name: &str) -> Vec<String> {
        let Some(session) = self.active_session() else {
            return Vec::new();
        };
        if self.kind.images_path().is_none() {
            return Vec::new();
        }
        let Some(artifact) = session.artifact(artifact_name) else {
            return Vec::new();
        };

        let result = bounded(
            self.request_timeout,
            self.api
                .preview_images(self.kind, &session.id, &artifact.filename),
        )
        .await;

        match result {
            Ok(response) if response.is_success() => {
                parse_preview_images(&response.body).unwrap_or_else(|| {
                    warn!("⚠️ 无法识别预览图响应: {}", artifact.filename);
                    Vec::new()
                })
            }
            Ok(response) => {
                warn!(
                    "⚠️ 预览图接口返回 HTTP {} ({})",
                    response.status, artifact.filename
                );
                Vec::new()
            }
            Err(e) => {
                warn!("⚠️ 预览图请求失败 ({}): {}", artifact.filename, e);
                Vec::new()
            }
        }
    }

    /// 关闭当前会话；没有会话时什么也不做
    pub async fn close_session(&mut self) {
        if let Some(mut guard) = self.active.take() {
            guard.close().await;
        }
    }
}
