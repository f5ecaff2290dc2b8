use civic_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env (可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env();

    // 3. 日志 (guard 必须存活到进程结束)
    let log_dir = config.log_dir();
    let _log_guard = init_logger_with_file(&config.log_level, config.log_json, Some(&log_dir))?;

    tracing::info!(
        environment = %config.environment,
        storage = ?config.storage_backend,
        "Civic issue server starting..."
    );
    if config.jwt.ephemeral {
        tracing::warn!("JWT_SECRET not set, using a random key; tokens will not survive a restart");
    }

    // 4. 启动前检查
    config.validate()?;

    // 5. 初始化状态
    let state = ServerState::initialize(&config).await?;

    // 6. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
