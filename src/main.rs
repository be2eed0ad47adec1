//! Restwire - 声明式路由服务
//!
//! 加载配置 → 声明控制器 → 注册路由 → 启动 HTTP 服务

use std::sync::Arc;

use restwire::application::Container;
use restwire::config::{load_config, print_config, AppConfig};
use restwire::infrastructure::adapters::{BearerTokenAuth, GrantScopeChecker, StaticLicense};
use restwire::infrastructure::http::{HealthController, HttpServer, ServerConfig};
use restwire::infrastructure::routing::{GuardServices, Registrar, Registry, RoutingConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},restwire={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    tracing::info!("Restwire v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 控制器声明与实例
    let mut registry = Registry::new();
    HealthController::declare(&mut registry);

    let container = Container::new();
    container.provide(HealthController::new());

    // 守卫依赖的外部服务
    let services = GuardServices {
        auth: Arc::new(BearerTokenAuth::from_config(&config.auth.tokens)),
        license: Arc::new(StaticLicense::new(config.license.features.iter().cloned())),
        scopes: Arc::new(GrantScopeChecker::new()),
    };

    let routing = RoutingConfig {
        rest_prefix: config.endpoints.rest.clone(),
        production: config.mode.is_production(),
        guard_timeout: config.guards.timeout(),
        body_limit_bytes: config.server.body_limit_bytes,
    };

    // 配置错误在这里中止启动
    let routes = Registrar::new(&registry, &container, services, routing).register_controllers()?;

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, routes);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
