use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post, put},
};
use medlab_db_mysql::{
    DbConfig, MySqlPool, SchemaManager, StoreError, create_lazy_pool, create_pool, ensure_database,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, handlers};

pub struct MedlabServer {
    addr: SocketAddr,
    app: Router,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Main connection pool.
    pub pool: MySqlPool,
    /// Pool serving the SQL demo endpoint. `None` when the demo is
    /// disabled; a clone of the main pool unless a dedicated URL is
    /// configured.
    pub sql_pool: Option<MySqlPool>,
}

impl AppState {
    /// Builds state over pools that defer connecting until first use.
    ///
    /// Startup goes through [`ServerBuilder::build`], which connects
    /// eagerly and bootstraps the schema; this constructor is for
    /// embedding and tests where no query may run at all.
    pub fn connect_lazy(cfg: &AppConfig) -> Result<Self, StoreError> {
        let pool = create_lazy_pool(&cfg.database)?;
        let sql_pool = sql_demo_pool(cfg, &pool)?;
        Ok(Self { pool, sql_pool })
    }
}

fn sql_demo_pool(cfg: &AppConfig, main_pool: &MySqlPool) -> Result<Option<MySqlPool>, StoreError> {
    if !cfg.sql_demo.enabled {
        return Ok(None);
    }
    match cfg.sql_demo.url {
        // Dedicated pool, kept small; demo traffic is incidental.
        Some(ref url) => {
            let demo_cfg = DbConfig::new(url.clone()).with_pool_size(2);
            Ok(Some(create_lazy_pool(&demo_cfg)?))
        }
        None => Ok(Some(main_pool.clone())),
    }
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        // Health endpoint
        .route("/api/health", get(handlers::health::health))
        // Patient and doctor registries
        .route(
            "/api/patients",
            get(handlers::patients::list_patients).post(handlers::patients::create_patient),
        )
        .route(
            "/api/doctors",
            get(handlers::doctors::list_doctors).post(handlers::doctors::create_doctor),
        )
        // Test catalog
        .route("/api/tests", get(handlers::catalog::list_tests))
        // Order lifecycle
        .route(
            "/api/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route(
            "/api/orders/{order_id}",
            get(handlers::orders::get_order).put(handlers::orders::update_order),
        )
        .route(
            "/api/orders/{order_id}/results",
            put(handlers::orders::submit_results),
        )
        // Projections
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        .route("/api/reports", get(handlers::reports::list_reports))
        .route("/api/activity", get(handlers::activity::list_activity))
        // Lab settings
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        // Read-only demo console
        .route("/api/sql-demo", post(handlers::sql_demo::sql_demo))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            &tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Connects to MySQL, bootstraps the database and schema, and builds
    /// the router.
    pub async fn build(self) -> anyhow::Result<MedlabServer> {
        ensure_database(&self.config.database).await?;
        let pool = create_pool(&self.config.database).await?;
        SchemaManager::new(pool.clone()).ensure_schema().await?;

        let sql_pool = sql_demo_pool(&self.config, &pool)?;
        let state = AppState { pool, sql_pool };
        let app = build_app(&self.config, state);

        Ok(MedlabServer {
            addr: self.addr,
            app,
        })
    }
}

impl MedlabServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
