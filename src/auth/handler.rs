use axum::{Json, extract::State, response::Response};
use serde::{Deserialize, Serialize};

use super::{AuthError, Users};
use crate::api::{bad_request, conflict, internal_error, success, unauthorized};
use crate::handler::AppState;
use crate::unpack_error;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub token: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Response {
    let users = Users::new(state.db.connection());

    match users.create(&payload.username, &payload.password).await {
        Ok(user) => {
            tracing::info!(username = %user.username, "user signed up");
            success(SignupResponse {
                username: user.username,
            })
        }
        Err(AuthError::UsernameTaken) => conflict("username already taken"),
        Err(e @ (AuthError::InvalidUsername | AuthError::PasswordTooShort)) => {
            bad_request(&e.to_string())
        }
        Err(e) => {
            tracing::error!("failed to sign up user: {}", unpack_error(&e));
            internal_error("failed to sign up")
        }
    }
}

pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> Response {
    let users = Users::new(state.db.connection());

    let user = match users.authenticate(&payload.username, &payload.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => return unauthorized("invalid credentials"),
        Err(e) => {
            tracing::error!("failed to sign in user: {}", unpack_error(&e));
            return internal_error("failed to sign in");
        }
    };

    match state.jwt.generate_token(user.id, &user.username) {
        Ok(token) => {
            tracing::info!(username = %user.username, "user signed in");
            success(SigninResponse { token })
        }
        Err(e) => {
            tracing::error!("failed to issue token: {}", unpack_error(&e));
            internal_error("failed to sign in")
        }
    }
}
