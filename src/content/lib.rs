use anyhow::Result;
use libsql::Connection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Video,
    Image,
    Audio,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Image => "image",
            ContentType::Audio => "audio",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "article" => Some(ContentType::Article),
            "video" => Some(ContentType::Video),
            "image" => Some(ContentType::Image),
            "audio" => Some(ContentType::Audio),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: i32,
    pub user_id: i32,
    pub link: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContent {
    pub link: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

const CONTENT_COLUMNS: &str = r#"
    contents.id,
    contents.user_id,
    contents.link,
    contents.type,
    contents.title,
    contents.created_at,
    GROUP_CONCAT(DISTINCT tags.name) as tag_names
"#;

pub struct Contents<'a> {
    conn: &'a Connection,
}

impl<'a> Contents<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: i32, input: CreateContent) -> Result<Content> {
        let query = r#"
            INSERT INTO contents (user_id, link, type, title)
            VALUES (?, ?, ?, ?)
            RETURNING id
        "#;

        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![user_id, input.link, input.content_type.as_str(), input.title],
            )
            .await?;

        let content_id: i32 = if let Some(row) = rows.next().await? {
            row.get(0)?
        } else {
            anyhow::bail!("failed to create content")
        };

        for tag_name in &input.tags {
            let tag_id = self.get_or_create_tag(tag_name).await?;
            let link_query = "INSERT OR IGNORE INTO content_tags (content_id, tag_id) VALUES (?, ?)";
            self.conn
                .execute(link_query, libsql::params![content_id, tag_id])
                .await?;
        }

        match self.get(content_id).await? {
            Some(content) => Ok(content),
            None => anyhow::bail!("created content {} not found", content_id),
        }
    }

    async fn get_or_create_tag(&self, name: &str) -> Result<i32> {
        let insert_query = "INSERT OR IGNORE INTO tags (name) VALUES (?)";
        self.conn.execute(insert_query, libsql::params![name]).await?;

        let select_query = "SELECT id FROM tags WHERE name = ? LIMIT 1";
        let mut rows = self.conn.query(select_query, libsql::params![name]).await?;

        if let Some(row) = rows.next().await? {
            Ok(row.get(0)?)
        } else {
            anyhow::bail!("failed to get or create tag: {}", name)
        }
    }

    pub async fn get(&self, content_id: i32) -> Result<Option<Content>> {
        let query = format!(
            r#"
SELECT {CONTENT_COLUMNS}
FROM contents
LEFT JOIN content_tags ON content_tags.content_id = contents.id
LEFT JOIN tags ON tags.id = content_tags.tag_id
WHERE contents.id = ?
GROUP BY contents.id
"#
        );

        let mut rows = self.conn.query(&query, libsql::params![content_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_content(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_for_user(&self, user_id: i32, limit: i32, offset: i32) -> Result<Vec<Content>> {
        let query = format!(
            r#"
SELECT {CONTENT_COLUMNS}
FROM contents
LEFT JOIN content_tags ON content_tags.content_id = contents.id
LEFT JOIN tags ON tags.id = content_tags.tag_id
WHERE contents.user_id = ?
GROUP BY contents.id
ORDER BY contents.created_at DESC, contents.id DESC
LIMIT ? OFFSET ?
"#
        );

        let mut rows = self
            .conn
            .query(&query, libsql::params![user_id, limit, offset])
            .await?;
        let mut contents = Vec::new();

        while let Some(row) = rows.next().await? {
            contents.push(row_to_content(&row)?);
        }

        Ok(contents)
    }

    /// Every content row owned by the user, no pagination. Feeds the public
    /// shared-brain view.
    pub async fn list_all_for_user(&self, user_id: i32) -> Result<Vec<Content>> {
        // LIMIT -1 disables the cap in SQLite
        self.list_for_user(user_id, -1, 0).await
    }

    /// Deletes the row only if the caller owns it. Returns false when the id
    /// is unknown or belongs to another user.
    pub async fn delete(&self, user_id: i32, content_id: i32) -> Result<bool> {
        self.conn
            .execute(
                "DELETE FROM content_tags WHERE content_id IN (SELECT id FROM contents WHERE id = ? AND user_id = ?)",
                libsql::params![content_id, user_id],
            )
            .await?;

        let affected = self
            .conn
            .execute(
                "DELETE FROM contents WHERE id = ? AND user_id = ?",
                libsql::params![content_id, user_id],
            )
            .await?;

        Ok(affected > 0)
    }
}

fn split_comma_separated_string(s: String) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn row_to_content(row: &libsql::Row) -> Result<Content> {
    let type_text: String = row.get(3)?;
    let content_type = ContentType::from_str(&type_text)
        .ok_or_else(|| anyhow::anyhow!("unknown content type: {}", type_text))?;
    let tag_names: String = row.get::<Option<String>>(6)?.unwrap_or_default();

    Ok(Content {
        id: row.get(0)?,
        user_id: row.get(1)?,
        link: row.get(2)?,
        content_type,
        title: row.get(4)?,
        tags: split_comma_separated_string(tag_names),
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use libsql::Connection;

    async fn seed_user(conn: &Connection, username: &str) -> i32 {
        let mut rows = conn
            .query(
                "INSERT INTO users (username, password_hash) VALUES (?, 'x') RETURNING id",
                libsql::params![username],
            )
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get(0).unwrap()
    }

    fn input(title: &str, tags: &[&str]) -> CreateContent {
        CreateContent {
            link: format!("https://example.com/{}", title),
            content_type: ContentType::Article,
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_content_type_round_trip() {
        for t in [
            ContentType::Article,
            ContentType::Video,
            ContentType::Image,
            ContentType::Audio,
        ] {
            assert_eq!(ContentType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(ContentType::from_str("podcast"), None);
    }

    #[test]
    fn test_content_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ContentType::Article).unwrap(),
            r#""article""#
        );
        let t: ContentType = serde_json::from_str(r#""video""#).unwrap();
        assert_eq!(t, ContentType::Video);
    }

    #[tokio::test]
    async fn test_create_round_trips_tags() {
        let db = db::test_database().await;
        let contents = Contents::new(db.connection());
        let user_id = seed_user(db.connection(), "freja").await;

        let created = contents
            .create(user_id, input("rust-book", &["rust", "reading"]))
            .await
            .unwrap();

        assert_eq!(created.title, "rust-book");
        assert_eq!(created.user_id, user_id);
        let mut tags = created.tags.clone();
        tags.sort();
        assert_eq!(tags, vec!["reading".to_string(), "rust".to_string()]);
    }

    #[tokio::test]
    async fn test_tags_are_shared_between_contents() {
        let db = db::test_database().await;
        let contents = Contents::new(db.connection());
        let user_id = seed_user(db.connection(), "freja").await;

        contents
            .create(user_id, input("first", &["rust"]))
            .await
            .unwrap();
        contents
            .create(user_id, input("second", &["rust"]))
            .await
            .unwrap();

        let mut rows = db
            .connection()
            .query("SELECT COUNT(*) FROM tags WHERE name = 'rust'", ())
            .await
            .unwrap();
        let count: i32 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped() {
        let db = db::test_database().await;
        let contents = Contents::new(db.connection());
        let freja = seed_user(db.connection(), "freja").await;
        let soren = seed_user(db.connection(), "soren").await;

        contents.create(freja, input("hers", &[])).await.unwrap();
        contents.create(soren, input("his", &[])).await.unwrap();

        let listed = contents.list_for_user(freja, 50, 0).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "hers");
    }

    #[tokio::test]
    async fn test_delete_refuses_foreign_rows() {
        let db = db::test_database().await;
        let contents = Contents::new(db.connection());
        let freja = seed_user(db.connection(), "freja").await;
        let soren = seed_user(db.connection(), "soren").await;

        let created = contents.create(freja, input("hers", &["keep"])).await.unwrap();

        assert!(!contents.delete(soren, created.id).await.unwrap());
        assert!(contents.get(created.id).await.unwrap().is_some());

        assert!(contents.delete(freja, created.id).await.unwrap());
        assert!(contents.get(created.id).await.unwrap().is_none());

        // deleting again is a no-op
        assert!(!contents.delete(freja, created.id).await.unwrap());
    }
}
