//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建处理服务客户端
//! 2. **命令分发**：简历 / 求职信 / LinkedIn / 仪表盘
//! 3. **资源管理**：无论成功失败，流程结束时都销毁会话
//! 4. **产物落盘**：把预览存储中的产物写入输出目录

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clients::{AdminClient, HttpProcessingClient, ProcessingApi};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{CoverLetterDetails, DocumentKind, UploadFile};
use crate::orchestrator::Command;
use crate::session::{PreviewStore, SessionManager};
use crate::utils::logging;
use crate::utils::truncate_text;
use crate::workflow::{LinkedInFlow, UploadFlow};

/// 一次文档流程的结果
#[derive(Debug, Default)]
pub struct FlowReport {
    pub saved: Vec<PathBuf>,
    pub preview_images: Vec<String>,
}

/// 应用主结构
pub struct App {
    config: Config,
    api: Arc<dyn ProcessingApi>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        let api = HttpProcessingClient::new(&config).context("无法创建处理服务客户端")?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// 使用指定的处理服务实现
    pub fn with_api(config: Config, api: Arc<dyn ProcessingApi>) -> Self {
        Self { config, api }
    }

    /// 运行应用主逻辑
    pub async fn run(&self, command: Command) -> Result<()> {
        logging::log_startup(&self.config, command.label());

        match command {
            Command::Cv { file } => {
                let report = self
                    .run_document_flow(DocumentKind::CvEnhancement, &file, None)
                    .await?;
                logging::print_final_stats(&report.saved, report.preview_images.len());
            }
            Command::Cover { file, details } => {
                let report = self
                    .run_document_flow(DocumentKind::CoverLetter, &file, Some(details))
                    .await?;
                for (i, image) in report.preview_images.iter().enumerate() {
                    info!("  🖼️ 第 {} 页: {}", i + 1, truncate_text(image, 80));
                }
                logging::print_final_stats(&report.saved, report.preview_images.len());
            }
            Command::LinkedIn { file } => {
                let upload = UploadFile::from_path(&file).await?;
                let profile = LinkedInFlow::new(self.api.clone(), &self.config)
                    .optimize(upload)
                    .await
                    .context("LinkedIn 资料生成失败")?;
                println!("{}", serde_json::to_string_pretty(&profile)?);
            }
            Command::Dashboard { username, password } => {
                let admin = AdminClient::new(&self.config)?;
                let token = admin.login(&username, &password).await.context("登录失败")?;
                let snapshot = admin.dashboard(&token).await.context("读取仪表盘失败")?;
                println!("{}", serde_json::to_string_pretty(&snapshot.to_json())?);
            }
        }

        Ok(())
    }

    /// 运行一次需要会话的文档流程，结束时总是销毁会话
    pub async fn run_document_flow(
        &self,
        kind: DocumentKind,
        file: &Path,
        details: Option<CoverLetterDetails>,
    ) -> Result<FlowReport> {
        let upload = UploadFile::from_path(file)
            .await
            .with_context(|| format!("无法读取待上传文件: {}", file.display()))?;

        let manager = SessionManager::new(self.api.clone(), kind, &self.config);
        let mut flow = UploadFlow::new(manager, &self.config);

        let outcome = self.drive(&mut flow, upload, details).await;
        flow.teardown().await;

        outcome.with_context(|| format!("{} 流程失败", kind))
    }

    async fn drive(
        &self,
        flow: &mut UploadFlow,
        upload: UploadFile,
        details: Option<CoverLetterDetails>,
    ) -> AppResult<FlowReport> {
        flow.select_file(upload)?;
        if let Some(details) = details {
            flow.set_details(details)?;
        }

        flow.submit().await?;

        let mut report = FlowReport::default();
        if let Some(session) = flow.session() {
            logging::log_session(session);
        }
        if let Some(store) = flow.store() {
            report.saved = save_artifacts(store, Path::new(&self.config.output_dir)).await?;
        }

        let names: Vec<String> = flow
            .session()
            .map(|s| s.artifacts.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default();
        for name in names {
            report.preview_images.extend(flow.preview_images(&name).await);
        }

        flow.close().await?;
        Ok(report)
    }
}

/// 把预览存储中的产物写入目录，返回写入的路径
pub async fn save_artifacts(store: &PreviewStore, dir: &Path) -> AppResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::file_write_failed(dir, e))?;

    let mut saved = Vec::new();
    for handle in store.iter() {
        let Some(bytes) = handle.local_url().resolve() else {
            warn!("⚠️ {} 的本地 URL 已撤销, 跳过保存", handle.name);
            continue;
        };

        let file_name = Path::new(&handle.filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| format!("{}.pdf", handle.name).into());
        let path = dir.join(file_name);

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::file_write_failed(&path, e))?;
        saved.push(path);
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ArtifactHandle, ObjectUrlRegistry};
    use bytes::Bytes;

    #[tokio::test]
    async fn test_save_artifacts_strips_directories_from_filenames() {
        let registry = ObjectUrlRegistry::new();
        let mut store = PreviewStore::new();
        let blob = Bytes::from_static(b"%PDF-1.7 classic");
        store.put(
            "classic",
            ArtifactHandle::new(
                "classic",
                "../../etc/classic.pdf",
                "application/pdf",
                blob.clone(),
                registry.create(blob),
            ),
        );

        let dir = std::env::temp_dir().join(format!("resume_flow_save_{}", std::process::id()));
        let saved = save_artifacts(&store, &dir).await.unwrap();

        assert_eq!(saved, vec![dir.join("classic.pdf")]);
        let written = tokio::fs::read(&saved[0]).await.unwrap();
        assert_eq!(written, b"%PDF-1.7 classic");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
