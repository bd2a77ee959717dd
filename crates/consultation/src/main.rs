//! Ayoos consultation server.
//!
//! Serves the consultation REST API over a SQLite store, with the search
//! index in SQLite or Elasticsearch.

use ayoos_persistence::DefaultConsultationService;
use ayoos_persistence::backends::sqlite::{SqliteBackend, SqliteBackendConfig};
use ayoos_persistence::core::ConsultationService;
use ayoos_rest::{SearchBackendMode, ServerConfig, create_app_with_config, init_logging};
use clap::Parser;
use tracing::{info, warn};

/// Creates and initializes the SQLite backend from the server configuration.
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    let db_path = config.database_url.as_deref().unwrap_or("consultation.db");
    info!(database = %db_path, "Initializing SQLite backend");

    let backend = SqliteBackend::with_config(db_path, SqliteBackendConfig::default())?;
    backend.init_schema()?;

    info!(full_text = backend.fts_enabled(), "SQLite schema ready");
    Ok(backend)
}

/// Resolves when the process receives Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

/// Builds the app over `service` and serves it until shutdown.
async fn serve<S>(service: S, config: ServerConfig) -> anyhow::Result<()>
where
    S: ConsultationService + 'static,
{
    let addr = config.socket_addr();
    let app: axum::Router = create_app_with_config(service, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        api_prefix = %config.normalized_api_prefix(),
        search_backend = %config.search_backend,
        "Starting Ayoos consultation server"
    );

    match config.search_backend {
        SearchBackendMode::Sqlite => start_sqlite(config).await,
        SearchBackendMode::Elasticsearch => start_elasticsearch(config).await,
    }
}

/// Starts the server with the SQLite store and SQLite search index.
async fn start_sqlite(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;
    let service = DefaultConsultationService::new(backend.clone(), backend);
    serve(service, config).await
}

/// Starts the server with the SQLite store and an Elasticsearch index.
#[cfg(feature = "elasticsearch")]
async fn start_elasticsearch(config: ServerConfig) -> anyhow::Result<()> {
    use ayoos_persistence::backends::elasticsearch::{
        ElasticsearchAuth, ElasticsearchConfig, ElasticsearchIndex,
    };

    let store = create_sqlite_backend(&config)?;

    let auth = match (
        &config.elasticsearch_username,
        &config.elasticsearch_password,
    ) {
        (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };

    let nodes = config.elasticsearch_node_list();
    let es_config = ElasticsearchConfig {
        nodes: nodes.clone(),
        index_prefix: config.elasticsearch_index_prefix.clone(),
        auth,
        ..Default::default()
    };

    info!(
        nodes = ?nodes,
        index_prefix = %config.elasticsearch_index_prefix,
        "Initializing Elasticsearch search index"
    );

    let index = ElasticsearchIndex::new(es_config)?;
    index.initialize().await?;

    let service = DefaultConsultationService::new(store, index);
    serve(service, config).await
}

/// Fallback when the elasticsearch feature is not enabled.
#[cfg(not(feature = "elasticsearch"))]
async fn start_elasticsearch(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The elasticsearch search backend requires the 'elasticsearch' feature. \
         Build with: cargo build -p ayoos-consultation --features elasticsearch"
    )
}

#[cfg(not(feature = "sqlite"))]
compile_error!("The consultation server stores records in SQLite; enable the 'sqlite' feature");
