use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::db::DbPool;

pub struct LikeRepository {
    pool: DbPool,
}

impl LikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check whether a user has liked a post
    pub fn has_liked(&self, user_id: &Uuid, post_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE user_id = ? AND post_id = ?",
            (user_id.to_string(), post_id.to_string()),
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Toggle a like: insert if absent, remove if present
    ///
    /// Returns true when the post is liked after the call. The composite
    /// primary key on (user_id, post_id) makes a double-like impossible.
    pub fn toggle(&self, user_id: &Uuid, post_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;

        let removed = conn
            .execute(
                "DELETE FROM likes WHERE user_id = ? AND post_id = ?",
                (user_id.to_string(), post_id.to_string()),
            )
            .context("Failed to remove like")?;

        if removed > 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)",
            (
                user_id.to_string(),
                post_id.to_string(),
                Utc::now().to_rfc3339(),
            ),
        )
        .context("Failed to add like")?;

        Ok(true)
    }

    /// Count likes on a post
    pub fn count_for_post(&self, post_id: &Uuid) -> Result<i32> {
        let conn = self.pool.get()?;
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?",
            [post_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, LikeRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.seed_test_data().expect("Failed to seed test data");
        let repo = LikeRepository::new(db.pool.clone());
        (db, repo)
    }

    #[test]
    fn test_toggle_like_unlike() {
        let (_db, repo) = setup_test_db();
        let user = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap();
        let post = Uuid::parse_str("770e8400-e29b-41d4-a716-446655440001").unwrap();

        assert!(!repo.has_liked(&user, &post).unwrap());
        assert!(repo.toggle(&user, &post).unwrap());
        assert!(repo.has_liked(&user, &post).unwrap());

        // Second toggle removes the like instead of duplicating it
        assert!(!repo.toggle(&user, &post).unwrap());
        assert!(!repo.has_liked(&user, &post).unwrap());
    }

    #[test]
    fn test_like_count_never_exceeds_one_per_user() {
        let (_db, repo) = setup_test_db();
        let user = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap();
        let post = Uuid::parse_str("770e8400-e29b-41d4-a716-446655440006").unwrap();

        let before = repo.count_for_post(&post).unwrap();
        repo.toggle(&user, &post).unwrap();
        repo.toggle(&user, &post).unwrap();
        repo.toggle(&user, &post).unwrap();

        // Odd number of toggles: exactly one like from this user
        assert_eq!(repo.count_for_post(&post).unwrap(), before + 1);
    }

    use proptest::prelude::*;

    // For any toggle sequence, the final like state is just the parity
    // of its length, and the post's count moves by at most one.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn prop_toggle_state_follows_parity(toggles in 0usize..6) {
            let (_db, repo) = setup_test_db();
            let user = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap();
            let post = Uuid::parse_str("770e8400-e29b-41d4-a716-446655440002").unwrap();

            let before = repo.count_for_post(&post).unwrap();
            for _ in 0..toggles {
                repo.toggle(&user, &post).unwrap();
            }

            let liked = repo.has_liked(&user, &post).unwrap();
            prop_assert_eq!(liked, toggles % 2 == 1);
            prop_assert_eq!(
                repo.count_for_post(&post).unwrap(),
                before + if liked { 1 } else { 0 }
            );
        }
    }
}
