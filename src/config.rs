use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult, FileError};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 文档处理服务地址
    pub processing_base_url: String,
    /// 后台管理接口地址
    pub admin_base_url: String,
    /// 单次网络请求的超时时间（秒）
    pub request_timeout_secs: u64,
    /// 上传文件大小上限（字节）
    pub max_upload_bytes: u64,
    /// 唯一接受的上传/下载类型
    pub accepted_media_type: String,
    /// 产物输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing_base_url: "https://ai.cvaluepro.com".to_string(),
            admin_base_url: "https://admin.cvaluepro.com".to_string(),
            request_timeout_secs: 30,
            max_upload_bytes: 10 * 1024 * 1024,
            accepted_media_type: "application/pdf".to_string(),
            output_dir: "output".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺省的键使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
        toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.to_path_buf(),
                source: e,
            })
        })
    }

    /// 环境变量覆盖已有配置，解析失败的值会被忽略
    pub fn with_env_overrides(self) -> Self {
        Self {
            processing_base_url: env_or("PROCESSING_BASE_URL", self.processing_base_url),
            admin_base_url: env_or("ADMIN_BASE_URL", self.admin_base_url),
            request_timeout_secs: env_parsed_or("REQUEST_TIMEOUT_SECS", self.request_timeout_secs),
            max_upload_bytes: env_parsed_or("MAX_UPLOAD_BYTES", self.max_upload_bytes),
            accepted_media_type: env_or("ACCEPTED_MEDIA_TYPE", self.accepted_media_type),
            output_dir: env_or("OUTPUT_DIR", self.output_dir),
            verbose_logging: env_parsed_or("VERBOSE_LOGGING", self.verbose_logging),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_or(key: &str, current: String) -> String {
    std::env::var(key).unwrap_or(current)
}

fn env_parsed_or<T: std::str::FromStr>(key: &str, current: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = Config::default();
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.accepted_media_type, "application/pdf");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_toml_file_keeps_defaults_for_missing_keys() {
        let path = std::env::temp_dir()
            .join(format!("resume_flow_config_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "processing_base_url = \"http://127.0.0.1:9000\"\nrequest_timeout_secs = 5\n",
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.processing_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.output_dir, "output");
    }

    #[test]
    fn test_from_toml_file_reports_parse_error() {
        let path =
            std::env::temp_dir().join(format!("resume_flow_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "request_timeout_secs = \"soon\"\n").unwrap();

        let result = Config::from_toml_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            result,
            Err(AppError::File(FileError::TomlParseFailed { .. }))
        ));
    }
}
