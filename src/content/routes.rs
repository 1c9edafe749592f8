use axum::{
    Router,
    routing::{delete, get, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_content))
        .route("/", get(handler::list_content))
        .route("/:id", delete(handler::delete_content))
}
