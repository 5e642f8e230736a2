use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use erpgraph_auth::{AllowAll, DynPermissionChecker, RolePolicy};
use erpgraph_core::ModelRegistry;
use erpgraph_db_memory::InMemoryStorage;
use erpgraph_graphql::{
    EntitySchemaBuilder, GraphQLContextTemplate, GraphQLState, REQUEST_ID_HEADER,
    graphiql_handler, graphql_handler, graphql_handler_get,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, AuthMode};
use crate::{handlers, middleware as app_middleware, models, services};

/// Everything built at boot and shared by the routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ModelRegistry>,
    pub storage: InMemoryStorage,
    pub graphql: GraphQLState,
}

impl AppState {
    /// Builds registry, storage, permissions, services and schema, in that order.
    pub fn from_config(cfg: AppConfig) -> anyhow::Result<Self> {
        let registry = Arc::new(models::registry()?);
        let storage = InMemoryStorage::new(Arc::clone(&registry));

        let permissions: DynPermissionChecker = match cfg.auth.mode {
            AuthMode::AllowAll => Arc::new(AllowAll),
            AuthMode::Policy => Arc::new(RolePolicy::new(cfg.auth.policy())),
        };

        let services = Arc::new(services::registry()?);
        let builder = EntitySchemaBuilder::new(
            Arc::clone(&registry),
            Arc::clone(&services),
            cfg.graphql.to_schema_builder_config(),
        );
        let schema = builder.build()?;

        tracing::info!(
            entities = registry.len(),
            services = services.len(),
            auth = ?cfg.auth.mode,
            "Application state initialized"
        );

        let config = Arc::new(cfg);
        let graphql = GraphQLState {
            schema,
            context_template: GraphQLContextTemplate::new(
                Arc::new(storage.clone()),
                &builder,
                permissions,
            ),
            config: Arc::new(config.graphql.clone()),
        };

        Ok(Self {
            config,
            registry,
            storage,
            graphql,
        })
    }
}

pub struct ErpGraphServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: &AppState) -> Router {
    let gql = &state.config.graphql;
    let mut graphql_routes =
        Router::new().route(&gql.path, get(graphql_handler_get).post(graphql_handler));
    if gql.graphiql {
        graphql_routes = graphql_routes.route("/graphiql", get(graphiql_handler));
    }

    let body_limit = state.config.server.body_limit_bytes;
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/test-log", get(handlers::test_log))
        .merge(graphql_routes.with_state(state.graphql.clone()))
        // Middleware stack, outermost last: request id -> trace -> cors -> compression -> body limit
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id))
}

pub struct ServerBuilder {
    /// Overrides `server.host` / `server.port` when set
    addr: Option<SocketAddr>,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            addr: None,
            config: AppConfig::default(),
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<ErpGraphServer> {
        let addr = match self.addr {
            Some(addr) => addr,
            None => self.config.addr().map_err(anyhow::Error::msg)?,
        };
        let state = AppState::from_config(self.config)?;
        let app = build_app(&state);

        Ok(ErpGraphServer { addr, app })
    }
}

impl ErpGraphServer {
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
