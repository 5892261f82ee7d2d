use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use tether_types::Post;

use crate::db::DbPool;

const SELECT_COLUMNS: &str = "p.id, p.author_id, u.first_name || ' ' || u.last_name AS author_name, p.content, p.created_at,
        (SELECT COUNT(*) FROM likes WHERE post_id = p.id) AS like_count,
        (SELECT COUNT(*) FROM comments WHERE post_id = p.id) AS comment_count";

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
            author_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
            author_name: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get::<_, String>(4)?.parse::<DateTime<Utc>>().unwrap(),
            like_count: row.get(5)?,
            comment_count: row.get(6)?,
            viewer_has_liked: None, // Populated by the API layer if authenticated
        })
    }

    /// Create a new post
    pub fn create(&self, post: &Post) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO posts (id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
            (
                post.id.to_string(),
                post.author_id.to_string(),
                &post.content,
                post.created_at.to_rfc3339(),
            ),
        )
        .context("Failed to create post")?;
        Ok(())
    }

    /// Get a single post by ID
    pub fn get_by_id(&self, post_id: &Uuid) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {SELECT_COLUMNS}
             FROM posts p
             JOIN users u ON p.author_id = u.id
             WHERE p.id = ?"
        );
        let mut stmt = conn.prepare(&query)?;

        let post = stmt
            .query_row([post_id.to_string()], Self::map_row)
            .optional()?;

        Ok(post)
    }

    /// Get posts by a specific author, newest first, with pagination
    pub fn get_by_author(&self, author_id: &Uuid, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {SELECT_COLUMNS}
             FROM posts p
             JOIN users u ON p.author_id = u.id
             WHERE p.author_id = ?
             ORDER BY p.created_at DESC
             LIMIT ? OFFSET ?"
        );
        let mut stmt = conn.prepare(&query)?;

        let posts = stmt
            .query_map(
                rusqlite::params![author_id.to_string(), limit, offset],
                Self::map_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// Assemble a feed: posts authored by the given set of users,
    /// newest first, with offset/limit pagination
    ///
    /// Pure read-time join; no caching or materialization.
    pub fn get_feed(&self, author_ids: &[Uuid], offset: i64, limit: i64) -> Result<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.pool.get()?;
        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let query = format!(
            "SELECT {SELECT_COLUMNS}
             FROM posts p
             JOIN users u ON p.author_id = u.id
             WHERE p.author_id IN ({placeholders})
             ORDER BY p.created_at DESC
             LIMIT {limit} OFFSET {offset}"
        );
        let mut stmt = conn.prepare(&query)?;

        let params = rusqlite::params_from_iter(author_ids.iter().map(|id| id.to_string()));
        let posts = stmt
            .query_map(params, Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// Delete a post; cascades remove its comments and likes
    pub fn delete(&self, post_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows_affected = conn
            .execute("DELETE FROM posts WHERE id = ?", [post_id.to_string()])
            .context("Failed to delete post")?;
        Ok(rows_affected)
    }

    /// Get post count for a user
    pub fn get_post_count(&self, user_id: &Uuid) -> Result<i32> {
        let conn = self.pool.get()?;
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE author_id = ?",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, PostRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.seed_test_data().expect("Failed to seed test data");
        let repo = PostRepository::new(db.pool.clone());
        (db, repo)
    }

    fn user(n: u32) -> Uuid {
        Uuid::parse_str(&format!("550e8400-e29b-41d4-a716-4466554400{:02}", n)).unwrap()
    }

    #[test]
    fn test_feed_contains_only_listed_authors() {
        let (_db, repo) = setup_test_db();
        let authors = vec![user(2), user(3)];

        let feed = repo.get_feed(&authors, 0, 50).unwrap();
        assert!(!feed.is_empty());
        assert!(feed.iter().all(|p| authors.contains(&p.author_id)));
    }

    #[test]
    fn test_feed_is_newest_first() {
        let (_db, repo) = setup_test_db();
        let authors = vec![user(1), user(2), user(3), user(4), user(5)];

        let feed = repo.get_feed(&authors, 0, 50).unwrap();
        assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_feed_pagination() {
        let (_db, repo) = setup_test_db();
        let authors = vec![user(1), user(2), user(3), user(4), user(5)];

        let all = repo.get_feed(&authors, 0, 50).unwrap();
        let first = repo.get_feed(&authors, 0, 2).unwrap();
        let second = repo.get_feed(&authors, 2, 2).unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, all[0].id);
        assert_eq!(second[0].id, all[2].id);
    }

    #[test]
    fn test_feed_for_empty_author_set() {
        let (_db, repo) = setup_test_db();
        let feed = repo.get_feed(&[], 0, 20).unwrap();
        assert!(feed.is_empty());
    }

    #[test]
    fn test_counts_are_read_time() {
        let (_db, repo) = setup_test_db();
        let post_id = Uuid::parse_str("770e8400-e29b-41d4-a716-446655440001").unwrap();

        let post = repo.get_by_id(&post_id).unwrap().unwrap();
        assert_eq!(post.like_count, 2);
        assert_eq!(post.comment_count, 2);
    }

    #[test]
    fn test_delete_cascades() {
        let (db, repo) = setup_test_db();
        let post_id = Uuid::parse_str("770e8400-e29b-41d4-a716-446655440001").unwrap();

        assert_eq!(repo.delete(&post_id).unwrap(), 1);
        assert!(repo.get_by_id(&post_id).unwrap().is_none());

        let conn = db.connection().unwrap();
        let orphans: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM comments WHERE post_id = ?",
                [post_id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
