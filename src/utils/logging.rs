/// 日志工具模块
///
/// 提供日志初始化和输出格式化的辅助函数
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::Session;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。可重复调用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, command: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}", command);
    info!("🌐 处理服务: {}", config.processing_base_url);
    info!("⏱️ 请求超时: {}s", config.request_timeout_secs);
    info!("{}", "=".repeat(60));
}

/// 记录会话产物信息
pub fn log_session(session: &Session) {
    info!("\n{}", "─".repeat(60));
    info!("🗂️ 会话: {}", session.id);
    for (i, artifact) in session.artifacts.iter().enumerate() {
        info!("  {}. {} → {}", i + 1, artifact.name, artifact.filename);
    }
    if let Some(email) = &session.contact.email {
        info!("  📧 {}", email);
    }
    if let Some(phone) = &session.contact.phone {
        info!("  📞 {}", phone);
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(saved: &[PathBuf], preview_images: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for path in saved {
        info!("✅ 已保存: {}", path.display());
    }
    if preview_images > 0 {
        info!("🖼️ 预览图: {} 张", preview_images);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("求职信预览", 2), "求职...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}
