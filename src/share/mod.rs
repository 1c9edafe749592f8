//! Share Module
//!
//! Turns a user's private content collection into a discoverable, read-only
//! public view gated by an unguessable token. Publishing is idempotent:
//! repeated publish calls return the existing token unchanged, and a user
//! holds at most one live token at a time, enforced by a uniqueness
//! constraint on the owning user. Resolution is the only unauthenticated
//! read path in the service.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the share module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[("share_001_schema.sql", include_str!("migrations/001_schema.sql"))]
}
