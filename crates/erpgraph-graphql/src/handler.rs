//! Axum HTTP handlers for GraphQL endpoints.
//!
//! This module provides the HTTP handlers for GraphQL requests:
//! - `POST /graphql` - GraphQL endpoint
//! - `GET /graphql` - GraphQL (query via URL param)
//! - `GET /graphiql` - GraphiQL IDE
//!
//! The caller is read from the `x-user-id` / `x-user-roles` headers and the
//! request id from `x-request-id`, both set before the handler runs.

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use async_graphql::http::GraphiQLSource;
use async_graphql::{Request, Response, Variables};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse};
use erpgraph_auth::{Actor, DynPermissionChecker, RequestActor};
use erpgraph_storage::DynStorage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GraphQLConfig;
use crate::context::{ContextBuilderError, GraphQLContext, GraphQLContextBuilder};
use crate::error::GraphQLError;
use crate::schema::EntitySchemaBuilder;
use crate::services::ServiceRegistry;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// State shared across GraphQL handlers.
#[derive(Clone)]
pub struct GraphQLState {
    /// Schema built at startup.
    pub schema: Schema,

    /// Context builder template with shared dependencies.
    pub context_template: GraphQLContextTemplate,

    /// Endpoint configuration.
    pub config: Arc<GraphQLConfig>,
}

/// Template for building per-request GraphQL context.
///
/// This contains the shared dependencies that are cloned into each request's context.
#[derive(Clone)]
pub struct GraphQLContextTemplate {
    pub storage: DynStorage,
    pub services: Arc<ServiceRegistry>,
    pub permissions: DynPermissionChecker,
}

impl GraphQLContextTemplate {
    /// Creates a template dispatching through the same service registry the
    /// schema was built from.
    pub fn new(
        storage: DynStorage,
        builder: &EntitySchemaBuilder,
        permissions: DynPermissionChecker,
    ) -> Self {
        Self {
            storage,
            services: Arc::clone(builder.services()),
            permissions,
        }
    }
}

/// GraphQL request body.
#[derive(Debug, Deserialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string.
    pub query: String,

    /// Optional operation name for multi-operation documents.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables for the query.
    pub variables: Option<serde_json::Value>,
}

/// Query parameters for GET requests.
#[derive(Debug, Deserialize)]
pub struct GraphQLQueryParams {
    /// The GraphQL query string.
    pub query: Option<String>,

    /// Optional operation name.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables (JSON string).
    pub variables: Option<String>,
}

/// GraphQL response body.
#[derive(Debug, Serialize)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<serde_json::Value>,
}

impl From<Response> for GraphQLResponse {
    fn from(resp: Response) -> Self {
        let data_json = serde_json::to_value(&resp.data).unwrap_or(serde_json::Value::Null);
        let data = if data_json.is_null() {
            None
        } else {
            Some(data_json)
        };

        // Errors keep their message, locations, path and extensions.code
        let errors = resp
            .errors
            .iter()
            .map(|e| serde_json::to_value(e).unwrap_or(serde_json::Value::Null))
            .collect();

        Self { data, errors }
    }
}

/// Handles POST requests to the GraphQL endpoint.
pub async fn graphql_handler(
    State(state): State<GraphQLState>,
    RequestActor(actor): RequestActor,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> impl IntoResponse {
    debug!(actor = ?actor.as_ref().map(|a| &a.id), "Processing GraphQL request");

    execute_graphql(state, headers, request, actor)
        .await
        .into_response()
}

/// Handles GET requests to the GraphQL endpoint.
///
/// This endpoint supports GraphQL queries via URL query parameters.
pub async fn graphql_handler_get(
    State(state): State<GraphQLState>,
    RequestActor(actor): RequestActor,
    headers: HeaderMap,
    Query(params): Query<GraphQLQueryParams>,
) -> impl IntoResponse {
    let request = match params_to_request(params) {
        Ok(req) => req,
        Err(e) => {
            return error_response(GraphQLError::InvalidQuery(e.to_string())).into_response();
        }
    };

    debug!(actor = ?actor.as_ref().map(|a| &a.id), "Processing GraphQL GET request");

    execute_graphql(state, headers, request, actor)
        .await
        .into_response()
}

/// Serves the GraphiQL IDE pointed at the configured endpoint.
pub async fn graphiql_handler(State(state): State<GraphQLState>) -> impl IntoResponse {
    Html(
        GraphiQLSource::build()
            .endpoint(&state.config.path)
            .title("erpgraph")
            .finish(),
    )
}

/// Executes a GraphQL request.
async fn execute_graphql(
    state: GraphQLState,
    headers: HeaderMap,
    request: GraphQLRequest,
    actor: Option<Actor>,
) -> impl IntoResponse {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let context = match build_context(&state.context_template, request_id, actor) {
        Ok(ctx) => ctx,
        Err(e) => {
            return error_response(GraphQLError::Internal(e.to_string())).into_response();
        }
    };

    let mut gql_request = Request::new(&request.query);

    if let Some(op_name) = request.operation_name {
        gql_request = gql_request.operation_name(op_name);
    }

    if let Some(vars) = request.variables {
        gql_request = gql_request.variables(Variables::from_json(vars));
    }

    gql_request = gql_request.data(context);

    debug!(query = %request.query, "Executing GraphQL query");
    let response = state.schema.execute(gql_request).await;

    // Resolver errors are reported in the body with 200 OK
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(GraphQLResponse::from(response)),
    )
        .into_response()
}

/// Builds a GraphQL context from the template.
fn build_context(
    template: &GraphQLContextTemplate,
    request_id: String,
    actor: Option<Actor>,
) -> Result<GraphQLContext, ContextBuilderError> {
    GraphQLContextBuilder::new()
        .with_storage(template.storage.clone())
        .with_services(template.services.clone())
        .with_permissions(template.permissions.clone())
        .with_actor(actor)
        .with_request_id(request_id)
        .build()
}

/// Converts GET query params to a GraphQL request.
fn params_to_request(params: GraphQLQueryParams) -> Result<GraphQLRequest, serde_json::Error> {
    let variables = if let Some(vars_str) = params.variables {
        Some(serde_json::from_str(&vars_str)?)
    } else {
        None
    };

    Ok(GraphQLRequest {
        query: params.query.unwrap_or_default(),
        operation_name: params.operation_name,
        variables,
    })
}

/// Returns an error response.
fn error_response(error: GraphQLError) -> impl IntoResponse {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = serde_json::json!({
        "errors": [{
            "message": error.to_string(),
            "extensions": {
                "code": error.error_code(),
            }
        }]
    });

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
}
