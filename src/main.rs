use anyhow::Result;
use dify_batch_eval::utils::logging;
use dify_batch_eval::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let report = App::initialize(config)?.run().await?;

    if report.statistics.failed_count > 0 {
        tracing::warn!("⚠️ 有 {} 行调用失败，详见报告", report.statistics.failed_count);
    }

    Ok(())
}
