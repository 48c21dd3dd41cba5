//! # Resume Flow
//!
//! 简历增值服务的文档处理客户端：简历优化、求职信生成、LinkedIn 资料优化，
//! 以及后台登录和仪表盘读取。
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责 HTTP 收发
//! - `ProcessingApi` - 文档处理服务（上传 / 下载 / 预览图 / 删除会话）
//! - `AdminClient` - 后台登录与仪表盘
//!
//! ### ② 会话层（Session）
//! - `session/` - 持有服务端会话和本地产物
//! - `SessionManager` - 会话生命周期，同一时刻最多一个会话
//! - `PreviewStore` / `ObjectUrlRegistry` - 本地 URL 的分配与撤销
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次用户操作的状态机
//! - `UploadFlow` - 选择文件 → 上传 → 下载产物 → 预览 → 关闭
//! - `LinkedInFlow` - 单次上传，无会话
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 命令解析与应用入口

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{AdminClient, HttpProcessingClient, ProcessingApi, RawResponse};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{CoverLetterDetails, DocumentKind, Session, SessionId, UploadFile, UploadRequest};
pub use orchestrator::{App, Command};
pub use session::{ArtifactHandle, ObjectUrlRegistry, PreviewStore, SessionManager};
pub use workflow::{FlowState, LinkedInFlow, UploadFlow};
