use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use tether_types::{Education, Experience, Skill};

use crate::db::DbPool;

/// Repository for the per-user profile collections: experience, education
/// and skills.
pub struct ProfileRepository {
    pool: DbPool,
}

impl ProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn add_experience(&self, experience: &Experience) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO experiences (id, user_id, company, title, description, location, start_date, end_date, is_current)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                experience.id.to_string(),
                experience.user_id.to_string(),
                &experience.company,
                &experience.title,
                &experience.description,
                &experience.location,
                experience.start_date.to_string(),
                experience.end_date.map(|d| d.to_string()),
                if experience.is_current { 1 } else { 0 },
            ),
        )
        .context("Failed to add experience")?;
        Ok(())
    }

    /// Get experiences for a user, most recent start date first
    pub fn get_experiences(&self, user_id: &Uuid) -> Result<Vec<Experience>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, company, title, description, location, start_date, end_date, is_current
             FROM experiences
             WHERE user_id = ?
             ORDER BY start_date DESC",
        )?;

        let experiences = stmt
            .query_map([user_id.to_string()], |row| {
                let end_date: Option<String> = row.get(7)?;
                Ok(Experience {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                    user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                    company: row.get(2)?,
                    title: row.get(3)?,
                    description: row.get(4)?,
                    location: row.get(5)?,
                    start_date: row.get::<_, String>(6)?.parse::<NaiveDate>().unwrap(),
                    end_date: end_date.and_then(|d| d.parse::<NaiveDate>().ok()),
                    is_current: row.get::<_, i32>(8)? == 1,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(experiences)
    }

    pub fn add_education(&self, education: &Education) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO education (id, user_id, school, degree, field_of_study, description, start_date, end_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                education.id.to_string(),
                education.user_id.to_string(),
                &education.school,
                &education.degree,
                &education.field_of_study,
                &education.description,
                education.start_date.to_string(),
                education.end_date.map(|d| d.to_string()),
            ),
        )
        .context("Failed to add education")?;
        Ok(())
    }

    /// Get education entries for a user, most recent start date first
    pub fn get_education(&self, user_id: &Uuid) -> Result<Vec<Education>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, school, degree, field_of_study, description, start_date, end_date
             FROM education
             WHERE user_id = ?
             ORDER BY start_date DESC",
        )?;

        let entries = stmt
            .query_map([user_id.to_string()], |row| {
                let end_date: Option<String> = row.get(7)?;
                Ok(Education {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                    user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                    school: row.get(2)?,
                    degree: row.get(3)?,
                    field_of_study: row.get(4)?,
                    description: row.get(5)?,
                    start_date: row.get::<_, String>(6)?.parse::<NaiveDate>().unwrap(),
                    end_date: end_date.and_then(|d| d.parse::<NaiveDate>().ok()),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Add a skill; if the user already has it (case-insensitive), the
    /// existing row is returned instead of a duplicate
    pub fn add_skill(&self, user_id: &Uuid, name: &str) -> Result<Skill> {
        if let Some(existing) = self.find_skill(user_id, name)? {
            return Ok(existing);
        }

        let conn = self.pool.get()?;
        let skill = Skill {
            id: Uuid::new_v4(),
            user_id: *user_id,
            name: name.to_string(),
            endorsements: 0,
        };

        conn.execute(
            "INSERT INTO skills (id, user_id, name, endorsements) VALUES (?, ?, ?, 0)",
            (skill.id.to_string(), user_id.to_string(), name),
        )
        .context("Failed to add skill")?;

        Ok(skill)
    }

    fn find_skill(&self, user_id: &Uuid, name: &str) -> Result<Option<Skill>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, endorsements FROM skills
             WHERE user_id = ? AND name = ? COLLATE NOCASE",
        )?;

        let skill = stmt
            .query_row((user_id.to_string(), name), |row| {
                Ok(Skill {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                    user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                    name: row.get(2)?,
                    endorsements: row.get(3)?,
                })
            })
            .optional()?;

        Ok(skill)
    }

    /// Get skills for a user, most endorsed first
    pub fn get_skills(&self, user_id: &Uuid) -> Result<Vec<Skill>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, endorsements FROM skills
             WHERE user_id = ?
             ORDER BY endorsements DESC, name",
        )?;

        let skills = stmt
            .query_map([user_id.to_string()], |row| {
                Ok(Skill {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                    user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                    name: row.get(2)?,
                    endorsements: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(skills)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, ProfileRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.seed_test_data().expect("Failed to seed test data");
        let repo = ProfileRepository::new(db.pool.clone());
        (db, repo)
    }

    fn alice() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap()
    }

    #[test]
    fn test_experiences_newest_first() {
        let (_db, repo) = setup_test_db();
        let experiences = repo.get_experiences(&alice()).unwrap();

        assert_eq!(experiences.len(), 2);
        assert!(experiences[0].start_date >= experiences[1].start_date);
        assert!(experiences[0].is_current);
    }

    #[test]
    fn test_duplicate_skill_returns_existing() {
        let (_db, repo) = setup_test_db();

        let first = repo.add_skill(&alice(), "rust").unwrap();
        let again = repo.add_skill(&alice(), "RUST").unwrap();

        // Seed data already has "Rust" for alice; all three are the same row
        assert_eq!(first.id, again.id);
        assert_eq!(first.endorsements, 12);

        let skills = repo.get_skills(&alice()).unwrap();
        assert_eq!(skills.len(), 2);
    }

    #[test]
    fn test_skills_ordered_by_endorsements() {
        let (_db, repo) = setup_test_db();
        let skills = repo.get_skills(&alice()).unwrap();

        assert!(skills.windows(2).all(|w| w[0].endorsements >= w[1].endorsements));
    }
}
