use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use serde::{Deserialize, Serialize};

use super::{ShareError, Shares};
use crate::api::{internal_error, not_found, success, unauthorized};
use crate::auth;
use crate::handler::AppState;
use crate::unpack_error;

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub share: bool,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub hash: String,
}

#[derive(Debug, Serialize)]
pub struct UnshareResponse {
    pub message: String,
}

pub async fn set_share(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ShareRequest>,
) -> Response {
    let user_id = match auth::bearer_identity(&headers, &state.jwt) {
        Ok(id) => id,
        Err(e) => return unauthorized(&e.to_string()),
    };

    let shares = Shares::new(state.db.connection());

    if payload.share {
        match shares.publish(user_id).await {
            Ok(hash) => success(ShareResponse { hash }),
            Err(e) => {
                tracing::error!("failed to publish share link: {}", unpack_error(&e));
                internal_error("failed to update sharing")
            }
        }
    } else {
        match shares.unpublish(user_id).await {
            Ok(()) => success(UnshareResponse {
                message: "sharing disabled".to_string(),
            }),
            Err(e) => {
                tracing::error!("failed to revoke share link: {}", unpack_error(&e));
                internal_error("failed to update sharing")
            }
        }
    }
}

pub async fn resolve_share(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let shares = Shares::new(state.db.connection());

    match shares.resolve(&token).await {
        Ok(view) => success(view),
        Err(ShareError::LinkNotFound) => not_found("share link not found"),
        Err(ShareError::OwnerNotFound) => not_found("share link owner not found"),
        Err(e) => {
            tracing::error!("failed to resolve share link: {}", unpack_error(&e));
            internal_error("failed to resolve share link")
        }
    }
}
