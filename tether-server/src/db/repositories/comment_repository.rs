use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tether_types::Comment;

use crate::db::DbPool;

pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new comment
    pub fn create(&self, comment: &Comment) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO comments (id, post_id, author_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                comment.id.to_string(),
                comment.post_id.to_string(),
                comment.author_id.to_string(),
                &comment.content,
                comment.created_at.to_rfc3339(),
            ),
        )
        .context("Failed to create comment")?;
        Ok(())
    }

    /// Get all comments on a post, oldest first
    pub fn get_by_post(&self, post_id: &Uuid) -> Result<Vec<Comment>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.post_id, c.author_id, u.first_name || ' ' || u.last_name AS author_name, c.content, c.created_at
             FROM comments c
             JOIN users u ON c.author_id = u.id
             WHERE c.post_id = ?
             ORDER BY c.created_at ASC",
        )?;

        let comments = stmt
            .query_map([post_id.to_string()], |row| {
                Ok(Comment {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                    post_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                    author_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap(),
                    author_name: row.get(3)?,
                    content: row.get(4)?,
                    created_at: row.get::<_, String>(5)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}
