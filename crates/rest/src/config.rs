//! Server configuration for the consultation REST API.
//!
//! Every option can be given on the command line or through an environment
//! variable.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CONSULTATION_SERVER_PORT` | 8080 | Server port |
//! | `CONSULTATION_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `CONSULTATION_LOG_LEVEL` | info | Log level |
//! | `CONSULTATION_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `CONSULTATION_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `CONSULTATION_ENABLE_CORS` | true | Enable CORS |
//! | `CONSULTATION_CORS_ORIGINS` | * | Allowed origins |
//! | `CONSULTATION_CORS_METHODS` | GET,POST,PUT,DELETE,OPTIONS | Allowed methods |
//! | `CONSULTATION_CORS_HEADERS` | Content-Type,Authorization,Accept | Allowed headers |
//! | `CONSULTATION_APPLICATION_NAME` | consultationApp | Prefix of alert headers |
//! | `CONSULTATION_ENABLE_TRANSLATION` | true | Alert headers carry translation keys |
//! | `CONSULTATION_API_PREFIX` | /api | Path prefix of the API routes |
//! | `CONSULTATION_BASE_URL` | http://localhost:8080 | Base URL used in `Link` headers |
//! | `CONSULTATION_DATABASE_URL` | consultation.db | SQLite path or `:memory:` |
//! | `CONSULTATION_SEARCH_BACKEND` | sqlite | `sqlite` or `elasticsearch` |
//! | `CONSULTATION_ELASTICSEARCH_NODES` | http://localhost:9200 | Comma-separated node URLs |
//! | `CONSULTATION_ELASTICSEARCH_INDEX_PREFIX` | ayoos | Index name prefix |
//! | `CONSULTATION_ELASTICSEARCH_USERNAME` | | Basic auth user |
//! | `CONSULTATION_ELASTICSEARCH_PASSWORD` | | Basic auth password |
//! | `CONSULTATION_ENABLE_REQUEST_ID` | true | Set and propagate `x-request-id` |
//! | `CONSULTATION_DEFAULT_PAGE_SIZE` | 20 | Page size when none is requested |
//! | `CONSULTATION_MAX_PAGE_SIZE` | 2000 | Upper bound for requested page sizes |
//!
//! # Example
//!
//! ```rust
//! use ayoos_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     application_name: "clinicApp".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use clap::Parser;

/// Which engine serves the consultation search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchBackendMode {
    /// SQLite FTS5 (or LIKE) index in the same database as the store.
    #[default]
    Sqlite,
    /// External Elasticsearch cluster.
    Elasticsearch,
}

impl fmt::Display for SearchBackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBackendMode::Sqlite => write!(f, "sqlite"),
            SearchBackendMode::Elasticsearch => write!(f, "elasticsearch"),
        }
    }
}

impl FromStr for SearchBackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(SearchBackendMode::Sqlite),
            "elasticsearch" | "es" => Ok(SearchBackendMode::Elasticsearch),
            other => Err(format!(
                "unknown search backend '{}' (expected sqlite or elasticsearch)",
                other
            )),
        }
    }
}

/// Server configuration for the consultation REST API.
///
/// Built from command line arguments and environment variables with
/// [`ServerConfig::parse`], from the environment only with
/// [`ServerConfig::from_env`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "consultation")]
#[command(about = "Consultation REST API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "CONSULTATION_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "CONSULTATION_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "CONSULTATION_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "CONSULTATION_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "CONSULTATION_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "CONSULTATION_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "CONSULTATION_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "CONSULTATION_CORS_METHODS",
        default_value = "GET,POST,PUT,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "CONSULTATION_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept"
    )]
    pub cors_headers: String,

    /// Application name used as the alert header prefix (`X-{name}-alert`).
    #[arg(
        long,
        env = "CONSULTATION_APPLICATION_NAME",
        default_value = "consultationApp"
    )]
    pub application_name: String,

    /// Alert headers carry translation keys instead of human-readable messages.
    #[arg(long, env = "CONSULTATION_ENABLE_TRANSLATION", default_value = "true")]
    pub enable_translation: bool,

    /// Path prefix under which the API routes are mounted.
    #[arg(long, env = "CONSULTATION_API_PREFIX", default_value = "/api")]
    pub api_prefix: String,

    /// Base URL for the server (used in pagination `Link` headers).
    #[arg(
        long,
        env = "CONSULTATION_BASE_URL",
        default_value = "http://localhost:8080"
    )]
    pub base_url: String,

    /// SQLite database path, or `:memory:`.
    #[arg(long, env = "CONSULTATION_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Search index backend (sqlite or elasticsearch).
    #[arg(long, env = "CONSULTATION_SEARCH_BACKEND", default_value = "sqlite")]
    pub search_backend: SearchBackendMode,

    /// Elasticsearch node URLs (comma-separated).
    #[arg(
        long,
        env = "CONSULTATION_ELASTICSEARCH_NODES",
        default_value = "http://localhost:9200"
    )]
    pub elasticsearch_nodes: String,

    /// Elasticsearch index name prefix.
    #[arg(
        long,
        env = "CONSULTATION_ELASTICSEARCH_INDEX_PREFIX",
        default_value = "ayoos"
    )]
    pub elasticsearch_index_prefix: String,

    /// Elasticsearch basic auth user.
    #[arg(long, env = "CONSULTATION_ELASTICSEARCH_USERNAME")]
    pub elasticsearch_username: Option<String>,

    /// Elasticsearch basic auth password.
    #[arg(long, env = "CONSULTATION_ELASTICSEARCH_PASSWORD")]
    pub elasticsearch_password: Option<String>,

    /// Enable request ID tracking.
    #[arg(long, env = "CONSULTATION_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,

    /// Page size used when a request does not give one.
    #[arg(long, env = "CONSULTATION_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: usize,

    /// Largest page size a request may ask for.
    #[arg(long, env = "CONSULTATION_MAX_PAGE_SIZE", default_value = "2000")]
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept".to_string(),
            application_name: "consultationApp".to_string(),
            enable_translation: true,
            api_prefix: "/api".to_string(),
            base_url: "http://localhost:8080".to_string(),
            database_url: None,
            search_backend: SearchBackendMode::Sqlite,
            elasticsearch_nodes: "http://localhost:9200".to_string(),
            elasticsearch_index_prefix: "ayoos".to_string(),
            elasticsearch_username: None,
            elasticsearch_password: None,
            enable_request_id: true,
            default_page_size: 20,
            max_page_size: 2000,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables, ignoring the
    /// command line. Falls back to defaults when parsing fails.
    pub fn from_env() -> Self {
        Self::try_parse_from(["consultation"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the API prefix without a trailing slash (`""` for the root).
    pub fn normalized_api_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// Returns the configured Elasticsearch nodes.
    pub fn elasticsearch_node_list(&self) -> Vec<String> {
        self.elasticsearch_nodes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Validates the configuration and returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        // Used verbatim inside header names
        if self.application_name.is_empty()
            || !self
                .application_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            errors.push(format!(
                "Application name '{}' must be non-empty and contain only letters, digits, '-' or '_'",
                self.application_name
            ));
        }

        if url::Url::parse(&self.base_url).is_err() {
            errors.push(format!("Base URL '{}' is not a valid URL", self.base_url));
        }

        if self.search_backend == SearchBackendMode::Elasticsearch
            && self.elasticsearch_node_list().is_empty()
        {
            errors.push("Elasticsearch search backend needs at least one node".to_string());
        }

        if self.elasticsearch_username.is_some() != self.elasticsearch_password.is_some() {
            errors.push(
                "Elasticsearch username and password must be given together".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// Uses ephemeral port 0, an in-memory database, and disables CORS and
    /// request IDs.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            log_level: "debug".to_string(),
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            base_url: "http://localhost".to_string(),
            database_url: Some(":memory:".to_string()),
            enable_request_id: false,
            ..Default::default()
        }
    }
}
