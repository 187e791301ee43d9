use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Router};
use futures::FutureExt;
use libris_app::state::{AppConfig, AppState};
use sqlx::migrate::MigrateDatabase;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::Result;

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if !args.no_cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

#[cfg(feature = "openapi")]
fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;

    #[derive(utoipa::OpenApi)]
    #[openapi(info(title = "libris", description = "Library catalog API"))]
    struct OpenApi;

    OpenApi::openapi()
        .nest("/api/author", libris_app::rest_api::author::api_docs())
        .nest("/api/book", libris_app::rest_api::book::api_docs())
}

fn main_router(state: AppState) -> Router<()> {
    let upload_limit_mb = state.config().upload_limit_mb;

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api/author", libris_app::rest_api::author::router())
        .nest("/api/book", libris_app::rest_api::book::router(upload_limit_mb))
        .with_state(state)
        .route("/health", get(health));

    #[cfg(feature = "openapi")]
    {
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api_docs()),
        );
    }
    router
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {:?}", data_dir);
    }

    let database_url = config.database_url();
    if !sqlx::Sqlite::database_exists(&database_url).await? {
        sqlx::Sqlite::create_database(&database_url).await?;
        info!("Created database {database_url}");
    }

    let pool = libris_dal::new_pool(&database_url).await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let app_config = AppConfig {
        default_page_size: config.default_page_size,
        upload_limit_mb: config.upload_limit_mb,
    };
    Ok(AppState::new(app_config, pool))
}
