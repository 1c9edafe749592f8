//! Auth Module
//!
//! User identity for hjerne: signup with a bcrypt-hashed credential, signin
//! that issues a signed bearer token, and verification of that token on
//! every request that touches a user's private data.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hjerne::auth;
//!
//! // Mount the routes
//! let app = Router::new()
//!     .nest("/api/v1/auth", auth::routes())
//!     .with_state(app_state);
//!
//! // Gate a handler on the caller's identity
//! let user_id = auth::bearer_identity(&headers, &state.jwt)?;
//! ```

mod handler;
mod jwt;
mod lib;
mod routes;

pub use jwt::{Claims, JwtConfig, JwtService, bearer_identity};
pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the auth module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[("auth_001_users.sql", include_str!("migrations/001_users.sql"))]
}
