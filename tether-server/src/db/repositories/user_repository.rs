use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use tether_types::{UpdateProfileRequest, User};

use crate::db::DbPool;

const SELECT_COLUMNS: &str =
    "id, email, first_name, last_name, headline, summary, location, is_active, created_at";

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            headline: row.get(4)?,
            summary: row.get(5)?,
            location: row.get(6)?,
            is_active: row.get::<_, i32>(7)? == 1,
            created_at: row.get::<_, String>(8)?.parse::<DateTime<Utc>>().unwrap(),
        })
    }

    /// Create a new user
    pub fn create(&self, user: &User) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, email, first_name, last_name, headline, summary, location, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.email,
                &user.first_name,
                &user.last_name,
                &user.headline,
                &user.summary,
                &user.location,
                if user.is_active { 1 } else { 0 },
                user.created_at.to_rfc3339(),
            ),
        )
        .context("Failed to create user")?;
        Ok(())
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let query = format!("SELECT {SELECT_COLUMNS} FROM users WHERE id = ?");
        let mut stmt = conn.prepare(&query)?;

        let user = stmt
            .query_row([user_id.to_string()], Self::map_row)
            .optional()?;

        Ok(user)
    }

    /// Get user by email
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let query = format!("SELECT {SELECT_COLUMNS} FROM users WHERE email = ?");
        let mut stmt = conn.prepare(&query)?;

        let user = stmt.query_row([email], Self::map_row).optional()?;

        Ok(user)
    }

    /// Search users by name or email substring, case-insensitive
    pub fn search(&self, term: &str, limit: i64) -> Result<Vec<User>> {
        let conn = self.pool.get()?;
        let pattern = format!("%{}%", term);
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM users
             WHERE first_name LIKE ?1 COLLATE NOCASE
                OR last_name LIKE ?1 COLLATE NOCASE
                OR email LIKE ?1 COLLATE NOCASE
             ORDER BY last_name, first_name
             LIMIT ?2",
        );
        let mut stmt = conn.prepare(&query)?;

        let users = stmt
            .query_map(rusqlite::params![pattern, limit], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Update profile fields; fields left as None are untouched
    pub fn update_profile(&self, user_id: &Uuid, update: &UpdateProfileRequest) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows_affected = conn
            .execute(
                "UPDATE users SET
                    first_name = COALESCE(?1, first_name),
                    last_name = COALESCE(?2, last_name),
                    headline = COALESCE(?3, headline),
                    summary = COALESCE(?4, summary),
                    location = COALESCE(?5, location)
                 WHERE id = ?6",
                rusqlite::params![
                    update.first_name,
                    update.last_name,
                    update.headline,
                    update.summary,
                    update.location,
                    user_id.to_string(),
                ],
            )
            .context("Failed to update user profile")?;
        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, UserRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.seed_test_data().expect("Failed to seed test data");
        let repo = UserRepository::new(db.pool.clone());
        (db, repo)
    }

    #[test]
    fn test_get_by_email() {
        let (_db, repo) = setup_test_db();
        let user = repo.get_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(user.full_name(), "Alice Nguyen");
    }

    #[test]
    fn test_search_matches_name_and_email() {
        let (_db, repo) = setup_test_db();

        let by_name = repo.search("nguyen", 20).unwrap();
        assert_eq!(by_name.len(), 1);

        let by_email = repo.search("example.com", 20).unwrap();
        assert_eq!(by_email.len(), 5);

        let bounded = repo.search("example.com", 2).unwrap();
        assert_eq!(bounded.len(), 2);
    }

    #[test]
    fn test_update_profile_partial() {
        let (_db, repo) = setup_test_db();
        let alice = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();

        let update = UpdateProfileRequest {
            first_name: None,
            last_name: None,
            headline: Some("Staff Engineer".to_string()),
            summary: None,
            location: None,
        };
        assert_eq!(repo.update_profile(&alice, &update).unwrap(), 1);

        let user = repo.get_by_id(&alice).unwrap().unwrap();
        assert_eq!(user.headline.as_deref(), Some("Staff Engineer"));
        assert_eq!(user.first_name, "Alice"); // untouched
    }
}
