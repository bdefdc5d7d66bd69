//! 日志基础设施

use anyhow::Result;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::config::LoggingConfig;

pub struct Logger;

impl Logger {
    /// 初始化日志系统
    ///
    /// `RUST_LOG` 优先于配置中的级别。设置了 `log_dir` 时额外写入按日期滚动的
    /// 文件日志，返回的 guard 需要持有到进程结束，否则缓冲中的日志会丢失。
    pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

        let (file_layer, guard) = match &config.log_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let file_appender = rolling::daily(dir, &config.file_prefix);
                let (writer, guard) = non_blocking(file_appender);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(false);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let console_layer = config
            .console_output
            .then(|| fmt::layer().with_target(false));

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        Ok(guard)
    }
}
