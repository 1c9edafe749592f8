use std::sync::Arc;

use axum::{Json, response::IntoResponse};
use tracing::info;

use crate::api::ApiResponse;
use crate::auth::JwtService;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub jwt: Arc<JwtService>,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(ApiResponse { data: "ok" })
}
