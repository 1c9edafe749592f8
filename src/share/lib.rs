use libsql::Connection;
use rand::Rng;
use serde::Serialize;

use crate::content::{Content, Contents};

const TOKEN_LENGTH: usize = 10;
const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("share link not found")]
    LinkNotFound,

    #[error("share link owner not found")]
    OwnerNotFound,

    #[error("storage failure: {0}")]
    Storage(anyhow::Error),
}

impl From<libsql::Error> for ShareError {
    fn from(err: libsql::Error) -> Self {
        ShareError::Storage(err.into())
    }
}

impl From<anyhow::Error> for ShareError {
    fn from(err: anyhow::Error) -> Self {
        ShareError::Storage(err)
    }
}

/// A resolved share link: the owner's username and their full collection.
#[derive(Debug, Serialize)]
pub struct SharedView {
    pub username: String,
    pub content: Vec<Content>,
}

/// The public token is the only credential guarding a published collection,
/// so characters come from the thread-local CSPRNG.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

pub struct Shares<'a> {
    conn: &'a Connection,
}

impl<'a> Shares<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Publish the user's collection, returning the share token. Idempotent:
    /// if a link already exists the persisted token is returned unchanged,
    /// including when a concurrent publish won the insert.
    pub async fn publish(&self, user_id: i32) -> Result<String, ShareError> {
        loop {
            let token = generate_token();

            self.conn
                .execute(
                    "INSERT OR IGNORE INTO share_links (user_id, token) VALUES (?, ?)",
                    libsql::params![user_id, token.as_str()],
                )
                .await?;

            let mut rows = self
                .conn
                .query(
                    "SELECT token FROM share_links WHERE user_id = ?",
                    libsql::params![user_id],
                )
                .await?;

            if let Some(row) = rows.next().await? {
                return Ok(row.get(0)?);
            }

            // No row for this user: the fresh token collided with another
            // user's token and the insert was ignored. Regenerate.
        }
    }

    /// Revoke the user's share link. Idempotent: revoking when no link
    /// exists succeeds.
    pub async fn unpublish(&self, user_id: i32) -> Result<(), ShareError> {
        self.conn
            .execute(
                "DELETE FROM share_links WHERE user_id = ?",
                libsql::params![user_id],
            )
            .await?;
        Ok(())
    }

    /// Resolve a token to the owner's username and full content collection.
    /// Read-only. The owner lookup is a data-integrity guard: users are
    /// never deleted today, but an orphaned link must not resolve.
    pub async fn resolve(&self, token: &str) -> Result<SharedView, ShareError> {
        let mut rows = self
            .conn
            .query(
                "SELECT user_id FROM share_links WHERE token = ?",
                libsql::params![token],
            )
            .await?;

        let user_id: i32 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => return Err(ShareError::LinkNotFound),
        };

        let mut rows = self
            .conn
            .query(
                "SELECT username FROM users WHERE id = ?",
                libsql::params![user_id],
            )
            .await?;

        let username: String = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => return Err(ShareError::OwnerNotFound),
        };

        let content = Contents::new(self.conn).list_all_for_user(user_id).await?;

        Ok(SharedView { username, content })
    }
}
