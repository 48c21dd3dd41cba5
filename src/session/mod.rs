//! 会话层
//!
//! - `object_url` - 本地对象 URL 的分配与撤销
//! - `preview_store` - 当前会话已下载产物的预览存储
//! - `manager` - 会话生命周期（上传 → 下载 → 关闭）

pub mod manager;
pub mod object_url;
pub mod preview_store;

pub use manager::{SessionGuard, SessionManager};
pub use object_url::{LocalUrl, ObjectUrlRegistry};
pub use preview_store::{ArtifactHandle, PreviewStore};
