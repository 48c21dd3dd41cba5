//! 错误类型
//!
//! 按类别划分：上传、响应格式、下载、会话清理、文件校验、流程、后台管理、配置、文件读写。
//! 业务层统一返回 [`AppResult`]，二进制入口和编排层再用 `anyhow` 包一层上下文。

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::{DocumentKind, SessionId};
use crate::workflow::FlowState;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 上传失败（非成功响应或网络错误）
    #[error("上传错误: {0}")]
    Upload(#[from] UploadError),
    /// 服务端响应缺少必要字段
    #[error("响应格式错误: {0}")]
    MalformedResponse(#[from] MalformedResponseError),
    /// 产物下载失败
    #[error("下载错误: {0}")]
    Download(#[from] DownloadError),
    /// 服务端会话删除失败（只记录日志，不向用户展示）
    #[error("会话清理错误: {0}")]
    SessionCleanup(#[from] SessionCleanupError),
    /// 待上传文件不合法
    #[error("文件校验错误: {0}")]
    InvalidFile(#[from] InvalidFileError),
    /// 上传流程状态不允许该操作
    #[error("流程错误: {0}")]
    Flow(#[from] FlowError),
    /// 后台管理接口错误
    #[error("后台错误: {0}")]
    Admin(#[from] AdminError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 本地文件读写错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 底层传输错误（连接失败、超时、读取响应体失败）
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    /// 请求在限定时间内没有返回
    pub fn timed_out(limit: Duration) -> Self {
        Self {
            message: format!("请求超时 ({:?})", limit),
            timed_out: true,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

/// 上传错误
#[derive(Debug, Error)]
pub enum UploadError {
    /// 服务端返回非成功状态码
    #[error("服务端拒绝上传 ({endpoint}): HTTP {status}")]
    Rejected { endpoint: String, status: u16 },
    /// 网络请求失败或超时
    #[error("上传请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: TransportError,
    },
}

/// 响应格式错误
#[derive(Debug, Error)]
pub enum MalformedResponseError {
    /// 缺少 session_id
    #[error("响应中缺少 session_id ({endpoint})")]
    MissingSessionId { endpoint: String },
    /// 没有任何产物文件名
    #[error("响应中没有产物文件名 ({endpoint})")]
    MissingArtifacts { endpoint: String },
    /// 缺少其他必填字段
    #[error("响应中缺少字段 {field} ({endpoint})")]
    MissingField {
        endpoint: String,
        field: &'static str,
    },
    /// 响应体不是合法 JSON
    #[error("JSON解析失败 ({endpoint}): {source}")]
    InvalidJson {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 下载错误
#[derive(Debug, Error)]
pub enum DownloadError {
    /// 服务端返回非成功状态码
    #[error("下载 {filename} 失败: HTTP {status}")]
    Rejected { filename: String, status: u16 },
    /// Content-Type 与期望的二进制类型不符
    #[error("{filename} 的类型不正确: 期望 {expected}, 实际 {actual:?}")]
    UnexpectedContentType {
        filename: String,
        expected: String,
        actual: Option<String>,
    },
    /// 会话已关闭或已被新会话替换
    #[error("会话 {session_id} 已关闭, 不能再下载产物")]
    SessionClosed { session_id: SessionId },
    /// 会话中不存在该产物
    #[error("会话 {session_id} 中没有名为 {name} 的产物")]
    UnknownArtifact { session_id: SessionId, name: String },
    /// 网络请求失败或超时
    #[error("下载 {filename} 请求失败: {source}")]
    RequestFailed {
        filename: String,
        #[source]
        source: TransportError,
    },
}

/// 会话清理错误
#[derive(Debug, Error)]
pub enum SessionCleanupError {
    #[error("删除会话 {session_id} 被拒绝: HTTP {status}")]
    Rejected { session_id: SessionId, status: u16 },
    #[error("删除会话 {session_id} 请求失败: {source}")]
    RequestFailed {
        session_id: SessionId,
        #[source]
        source: TransportError,
    },
}

/// 文件校验错误
#[derive(Debug, Error)]
pub enum InvalidFileError {
    #[error("{file_name} 的类型 {media_type} 不受支持, 仅接受 {expected}")]
    UnsupportedMediaType {
        file_name: String,
        media_type: String,
        expected: String,
    },
    #[error("{file_name} 大小 {size} 字节超过上限 {max} 字节")]
    TooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },
    #[error("{file_name} 是空文件")]
    Empty { file_name: String },
}

/// 流程错误
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("尚未选择文件")]
    NoFileSelected,
    #[error("已有上传正在进行")]
    UploadInFlight,
    #[error("当前状态 {state} 不允许 {action}")]
    InvalidTransition {
        state: FlowState,
        action: &'static str,
    },
    #[error("{kind} 流程不支持附加表单字段")]
    DetailsNotSupported { kind: DocumentKind },
    #[error("{kind} 流程不产生会话")]
    SessionNotSupported { kind: DocumentKind },
    #[error("当前没有打开的会话")]
    NoActiveSession,
}

/// 后台管理接口错误
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("用户名或密码错误 (HTTP {status})")]
    InvalidCredentials { status: u16 },
    #[error("登录响应中没有 access_token")]
    MissingToken,
    #[error("后台接口 {endpoint} 返回 HTTP {status}")]
    Rejected { endpoint: String, status: u16 },
    #[error("后台接口 {endpoint} 请求失败: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: TransportError,
    },
    #[error("后台接口 {endpoint} JSON解析失败: {source}")]
    InvalidJson {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置项 {key} 的值 '{value}' 无法转换为 {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("无法创建 HTTP 客户端: {source}")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },
    #[error("无法识别的命令: {0}")]
    UnknownCommand(String),
    #[error("命令 {command} 缺少参数 {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

/// 文件读写错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML解析失败 ({}): {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建上传请求失败错误
    pub fn upload_request_failed(endpoint: impl Into<String>, source: TransportError) -> Self {
        AppError::Upload(UploadError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建下载请求失败错误
    pub fn download_request_failed(filename: impl Into<String>, source: TransportError) -> Self {
        AppError::Download(DownloadError::RequestFailed {
            filename: filename.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为会话清理错误（这类错误只记录，不打断界面流程）
    pub fn is_cleanup(&self) -> bool {
        matches!(self, AppError::SessionCleanup(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
