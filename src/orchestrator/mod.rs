//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `command` - 命令行参数解析
//!
//! ### `app` - 应用入口
//! - 创建处理服务客户端
//! - 按命令运行对应流程
//! - 流程结束时销毁会话、写出产物
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (命令分发)
//!     ↓
//! workflow::UploadFlow / LinkedInFlow (单次用户操作)
//!     ↓
//! session::SessionManager (会话生命周期)
//!     ↓
//! clients (HTTP：处理服务 / 后台)
//! ```

pub mod app;
pub mod command;

pub use app::{save_artifacts, App, FlowReport};
pub use command::Command;
