//! Content Module
//!
//! Saved bookmarks: a link with a type tag, a title, and an open set of
//! classification tags. Content is owner-scoped: it is written and deleted
//! only by the user who saved it, and read by its owner or through an active
//! share link.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the content module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[("content_001_schema.sql", include_str!("migrations/001_schema.sql"))]
}
