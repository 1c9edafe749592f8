use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::{Deserialize, Serialize};

use super::{Contents, CreateContent};
use crate::api::{created, internal_error, not_found, success, unauthorized};
use crate::auth;
use crate::handler::AppState;
use crate::unpack_error;

const DEFAULT_LIMIT: i32 = 50;
const MAX_LIMIT: i32 = 100;

#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub async fn create_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateContent>,
) -> Response {
    let user_id = match auth::bearer_identity(&headers, &state.jwt) {
        Ok(id) => id,
        Err(e) => return unauthorized(&e.to_string()),
    };

    let lib = Contents::new(state.db.connection());

    match lib.create(user_id, payload).await {
        Ok(content) => created(content),
        Err(e) => {
            tracing::error!("failed to create content: {}", unpack_error(e.as_ref()));
            internal_error("failed to create content")
        }
    }
}

pub async fn list_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PaginationParams>,
) -> Response {
    let user_id = match auth::bearer_identity(&headers, &state.jwt) {
        Ok(id) => id,
        Err(e) => return unauthorized(&e.to_string()),
    };

    let lib = Contents::new(state.db.connection());
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    match lib.list_for_user(user_id, limit, offset).await {
        Ok(contents) => success(contents),
        Err(e) => {
            tracing::error!("failed to list content: {}", unpack_error(e.as_ref()));
            internal_error("failed to list content")
        }
    }
}

pub async fn delete_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    let user_id = match auth::bearer_identity(&headers, &state.jwt) {
        Ok(id) => id,
        Err(e) => return unauthorized(&e.to_string()),
    };

    let lib = Contents::new(state.db.connection());

    match lib.delete(user_id, id).await {
        Ok(true) => success(DeleteResponse {
            message: "content deleted".to_string(),
        }),
        Ok(false) => not_found("content not found"),
        Err(e) => {
            tracing::error!("failed to delete content: {}", unpack_error(e.as_ref()));
            internal_error("failed to delete content")
        }
    }
}
