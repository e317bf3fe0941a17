//! GraphQL endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use itemstack_core::execution::{execute, GraphQlError, GraphQlRequest, GraphQlResponse};

use crate::state::AppState;

/// POST /graphql - Executes a GraphQL request.
///
/// Execution errors are reported in the `errors` array with status 200, the
/// way AppSync does. Only an unreadable body yields 400.
#[axum::debug_handler]
pub async fn graphql(
    State(state): State<AppState>,
    payload: Result<Json<GraphQlRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected GraphQL request");
            let response = GraphQlResponse::request_error(GraphQlError::new(
                rejection.body_text(),
                "BadRequest",
            ));
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    let response = execute(&state.engine, &request).await;

    if response.is_ok() {
        tracing::debug!(operation = ?request.operation_name, "GraphQL request executed");
    } else {
        tracing::info!(
            operation = ?request.operation_name,
            errors = response.errors.len(),
            "GraphQL request executed with errors"
        );
    }

    (StatusCode::OK, Json(response)).into_response()
}
