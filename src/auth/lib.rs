use libsql::Connection;

/// Cost factor for bcrypt hashing.
const BCRYPT_COST: u32 = 12;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already taken")]
    UsernameTaken,

    #[error("username must be 3-50 characters, start with a letter, and use only letters, numbers, '_' or '-'")]
    InvalidUsername,

    #[error("password must be at least 8 characters")]
    PasswordTooShort,

    #[error("authentication required")]
    MissingCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("storage failure: {0}")]
    Storage(anyhow::Error),
}

impl From<libsql::Error> for AuthError {
    fn from(err: libsql::Error) -> Self {
        AuthError::Storage(err.into())
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.len() < USERNAME_MIN || username.len() > USERNAME_MAX {
        return Err(AuthError::InvalidUsername);
    }

    if !username
        .chars()
        .next()
        .map(|c| c.is_alphabetic())
        .unwrap_or(false)
    {
        return Err(AuthError::InvalidUsername);
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AuthError::InvalidUsername);
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < PASSWORD_MIN {
        return Err(AuthError::PasswordTooShort);
    }

    Ok(())
}

pub struct Users<'a> {
    conn: &'a Connection,
}

impl<'a> Users<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, username: &str, password: &str) -> Result<User, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        let password_hash =
            bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::Hashing(e.to_string()))?;

        let query = r#"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            RETURNING id, username, password_hash, created_at
        "#;

        let mut rows = match self
            .conn
            .query(query, libsql::params![username, password_hash])
            .await
        {
            Ok(rows) => rows,
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                return Err(AuthError::UsernameTaken);
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(row) = rows.next().await? {
            Ok(row_to_user(&row)?)
        } else {
            Err(AuthError::Storage(anyhow::anyhow!("failed to create user")))
        }
    }

    /// Verifies a username/password pair. A missing user and a wrong password
    /// are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if matches {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let query = r#"
            SELECT id, username, password_hash, created_at
            FROM users WHERE username = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![username]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_user(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        let query = r#"
            SELECT id, username, password_hash, created_at
            FROM users WHERE id = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_user(&row)?))
        } else {
            Ok(None)
        }
    }
}

fn row_to_user(row: &libsql::Row) -> Result<User, AuthError> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("user").is_ok());
        assert!(validate_username("User123_test-name").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("a".repeat(51).as_str()).is_err());
        assert!(validate_username("123user").is_err());
        assert!(validate_username("user name").is_err());
        assert!(validate_username("user@name").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::PasswordTooShort)
        ));
    }

    #[tokio::test]
    async fn test_signup_then_signin() {
        let db = db::test_database().await;
        let users = Users::new(db.connection());

        let created = users.create("freja", "hunter2hunter2").await.unwrap();
        assert_eq!(created.username, "freja");
        assert_ne!(created.password_hash, "hunter2hunter2");

        let authed = users.authenticate("freja", "hunter2hunter2").await.unwrap();
        assert_eq!(authed.id, created.id);

        let found = users.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.username, "freja");
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let db = db::test_database().await;
        let users = Users::new(db.connection());

        users.create("freja", "hunter2hunter2").await.unwrap();

        let result = users.authenticate("freja", "not-the-password").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let db = db::test_database().await;
        let users = Users::new(db.connection());

        let result = users.authenticate("nobody", "hunter2hunter2").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = db::test_database().await;
        let users = Users::new(db.connection());

        users.create("freja", "hunter2hunter2").await.unwrap();

        let result = users.create("freja", "another-password").await;
        assert!(matches!(result, Err(AuthError::UsernameTaken)));
    }
}
