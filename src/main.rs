use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use users_api::{
    app::users::store::{MemoryUserStore, UserStore},
    build_router,
    infrastructure::logger::Logger,
    AppState, Config,
};

#[derive(Debug, Parser)]
#[command(name = "users-api", version, about = "用户管理 REST 服务")]
struct Cli {
    /// 配置文件路径，不指定时使用默认配置
    #[arg(short, long, env = "USERS_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => Config::default(),
    };
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = Some(url);
    }
    config.validate()?;

    // guard 需要持有到进程结束
    let _guard = Logger::init(&config.logging)?;
    info!("启动用户管理服务");

    let store = open_store(&config).await?;
    let state = AppState::new(store, &config)?;
    let app = build_router(state, &config.http);

    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法绑定到 {}", addr))?;
    info!("🚀 服务运行在 http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("服务已停止");
    Ok(())
}

#[cfg(feature = "database")]
async fn open_store(config: &Config) -> Result<Arc<dyn UserStore>> {
    use users_api::{
        app::users::pg_store::PgUserStore, infrastructure::database::DatabaseManager,
    };

    let Some(url) = &config.database.url else {
        info!("未配置数据库，使用内存存储");
        return Ok(Arc::new(MemoryUserStore::new()));
    };

    let manager = DatabaseManager::new(url, &config.database).await?;
    manager.ensure_schema().await?;
    Ok(Arc::new(PgUserStore::new(manager.get_pool().clone())))
}

#[cfg(not(feature = "database"))]
async fn open_store(config: &Config) -> Result<Arc<dyn UserStore>> {
    if config.database.url.is_some() {
        tracing::warn!("未启用 database feature，忽略数据库配置，使用内存存储");
    }
    Ok(Arc::new(MemoryUserStore::new()))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("收到退出信号，正在关闭");
    }
}
