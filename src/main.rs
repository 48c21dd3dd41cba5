use anyhow::Result;
use resume_flow::utils::logging;
use resume_flow::{App, Command, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：指定了配置文件时以文件为基础，环境变量覆盖
    let config = match std::env::var("RESUME_FLOW_CONFIG") {
        Ok(path) => Config::from_toml_file(&path)?.with_env_overrides(),
        Err(_) => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    let command = Command::parse(std::env::args().skip(1))?;

    App::initialize(config)?.run(command).await?;

    Ok(())
}
