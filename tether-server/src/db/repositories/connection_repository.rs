use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use tether_types::{Connection, ConnectionStatus};

use crate::db::DbPool;

const SELECT_COLUMNS: &str = "c.id, c.requester_id, c.addressee_id, c.status, c.message, c.created_at, c.updated_at,
        ur.first_name || ' ' || ur.last_name AS requester_name,
        ua.first_name || ' ' || ua.last_name AS addressee_name";

pub struct ConnectionRepository {
    pool: DbPool,
}

impl ConnectionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Connection> {
        let status_str: String = row.get(3)?;
        Ok(Connection {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
            requester_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
            addressee_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap(),
            status: ConnectionStatus::parse(&status_str).unwrap(),
            message: row.get(4)?,
            created_at: row.get::<_, String>(5)?.parse::<DateTime<Utc>>().unwrap(),
            updated_at: row.get::<_, String>(6)?.parse::<DateTime<Utc>>().unwrap(),
            requester_name: row.get(7)?,
            addressee_name: row.get(8)?,
        })
    }

    /// Find the connection between two users, in either orientation
    pub fn find_between(&self, user_a: &Uuid, user_b: &Uuid) -> Result<Option<Connection>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {SELECT_COLUMNS}
             FROM connections c
             JOIN users ur ON c.requester_id = ur.id
             JOIN users ua ON c.addressee_id = ua.id
             WHERE (c.requester_id = ?1 AND c.addressee_id = ?2)
                OR (c.requester_id = ?2 AND c.addressee_id = ?1)"
        );
        let mut stmt = conn.prepare(&query)?;

        let connection = stmt
            .query_row(
                rusqlite::params![user_a.to_string(), user_b.to_string()],
                Self::map_row,
            )
            .optional()?;

        Ok(connection)
    }

    /// Get a connection by ID
    pub fn get_by_id(&self, connection_id: &Uuid) -> Result<Option<Connection>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {SELECT_COLUMNS}
             FROM connections c
             JOIN users ur ON c.requester_id = ur.id
             JOIN users ua ON c.addressee_id = ua.id
             WHERE c.id = ?"
        );
        let mut stmt = conn.prepare(&query)?;

        let connection = stmt
            .query_row([connection_id.to_string()], Self::map_row)
            .optional()?;

        Ok(connection)
    }

    /// Insert a new pending connection request
    ///
    /// The caller is responsible for the self-request and duplicate-pair
    /// checks; the UNIQUE constraint only covers one orientation.
    pub fn create_request(
        &self,
        requester_id: &Uuid,
        addressee_id: &Uuid,
        message: Option<&str>,
    ) -> Result<Uuid> {
        let conn = self.pool.get()?;
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO connections (id, requester_id, addressee_id, status, message, created_at, updated_at)
             VALUES (?, ?, ?, 'pending', ?, ?, ?)",
            (
                id.to_string(),
                requester_id.to_string(),
                addressee_id.to_string(),
                message,
                &now,
                &now,
            ),
        )
        .context("Failed to create connection request")?;

        Ok(id)
    }

    /// Transition a pending connection to accepted or declined
    ///
    /// The WHERE clause guards the transition: rows that are no longer
    /// pending are left untouched and 0 is returned.
    pub fn respond(&self, connection_id: &Uuid, status: ConnectionStatus) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows_affected = conn
            .execute(
                "UPDATE connections SET status = ?, updated_at = ? WHERE id = ? AND status = 'pending'",
                (
                    status.as_str(),
                    Utc::now().to_rfc3339(),
                    connection_id.to_string(),
                ),
            )
            .context("Failed to update connection status")?;
        Ok(rows_affected)
    }

    /// Get IDs of all accepted-connection counterparts for a user
    pub fn accepted_counterpart_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT CASE WHEN requester_id = ?1 THEN addressee_id ELSE requester_id END
             FROM connections
             WHERE (requester_id = ?1 OR addressee_id = ?1) AND status = 'accepted'
             ORDER BY updated_at DESC",
        )?;

        let ids = stmt
            .query_map([user_id.to_string()], |row| {
                let id: String = row.get(0)?;
                Ok(Uuid::parse_str(&id).unwrap())
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    /// Get all accepted connections for a user, either orientation
    pub fn list_accepted(&self, user_id: &Uuid) -> Result<Vec<Connection>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {SELECT_COLUMNS}
             FROM connections c
             JOIN users ur ON c.requester_id = ur.id
             JOIN users ua ON c.addressee_id = ua.id
             WHERE (c.requester_id = ?1 OR c.addressee_id = ?1) AND c.status = 'accepted'
             ORDER BY c.updated_at DESC"
        );
        let mut stmt = conn.prepare(&query)?;

        let connections = stmt
            .query_map([user_id.to_string()], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(connections)
    }

    /// Get pending connection requests addressed to a user
    pub fn pending_for(&self, user_id: &Uuid) -> Result<Vec<Connection>> {
        let conn = self.pool.get()?;
        let query = format!(
            "SELECT {SELECT_COLUMNS}
             FROM connections c
             JOIN users ur ON c.requester_id = ur.id
             JOIN users ua ON c.addressee_id = ua.id
             WHERE c.addressee_id = ? AND c.status = 'pending'
             ORDER BY c.created_at DESC"
        );
        let mut stmt = conn.prepare(&query)?;

        let connections = stmt
            .query_map([user_id.to_string()], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(connections)
    }

    /// Count accepted connections for a user
    pub fn count_accepted(&self, user_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM connections
             WHERE (requester_id = ?1 OR addressee_id = ?1) AND status = 'accepted'",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, ConnectionRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.seed_test_data().expect("Failed to seed test data");
        let repo = ConnectionRepository::new(db.pool.clone());
        (db, repo)
    }

    fn user(n: u32) -> Uuid {
        Uuid::parse_str(&format!("550e8400-e29b-41d4-a716-4466554400{:02}", n)).unwrap()
    }

    #[test]
    fn test_find_between_is_orientation_agnostic() {
        let (_db, repo) = setup_test_db();
        let alice = user(1);
        let bob = user(2);

        let forward = repo.find_between(&alice, &bob).unwrap();
        let reverse = repo.find_between(&bob, &alice).unwrap();

        assert!(forward.is_some());
        assert_eq!(forward.unwrap().id, reverse.unwrap().id);
    }

    #[test]
    fn test_reverse_request_sees_existing_row() {
        let (_db, repo) = setup_test_db();
        let dave = user(4);
        let erin = user(5);

        assert!(repo.find_between(&dave, &erin).unwrap().is_none());
        repo.create_request(&dave, &erin, None).unwrap();

        // The caller-side duplicate check must find the row from either end,
        // so request(b, a) after request(a, b) can never insert a second row.
        assert!(repo.find_between(&erin, &dave).unwrap().is_some());
    }

    #[test]
    fn test_respond_transitions_pending_only() {
        let (_db, repo) = setup_test_db();
        let dave = user(4);
        let erin = user(5);

        let id = repo.create_request(&dave, &erin, Some("hello")).unwrap();

        let updated = repo.respond(&id, ConnectionStatus::Accepted).unwrap();
        assert_eq!(updated, 1);

        // Terminal states are frozen: a second respond touches no rows
        let updated = repo.respond(&id, ConnectionStatus::Declined).unwrap();
        assert_eq!(updated, 0);

        let row = repo.get_by_id(&id).unwrap().unwrap();
        assert_eq!(row.status, ConnectionStatus::Accepted);
    }

    #[test]
    fn test_accepted_connections_are_symmetric() {
        let (_db, repo) = setup_test_db();
        let alice = user(1);
        let bob = user(2);

        let alice_peers = repo.accepted_counterpart_ids(&alice).unwrap();
        let bob_peers = repo.accepted_counterpart_ids(&bob).unwrap();

        assert!(alice_peers.contains(&bob));
        assert!(bob_peers.contains(&alice));
    }

    #[test]
    fn test_declined_rows_are_excluded_from_listings() {
        let (_db, repo) = setup_test_db();
        let bob = user(2);
        let erin = user(5);

        // erin -> bob was declined in seed data
        assert!(!repo.accepted_counterpart_ids(&bob).unwrap().contains(&erin));
        assert!(repo.pending_for(&bob).unwrap().is_empty());

        // but the row still occupies the pair
        assert!(repo.find_between(&bob, &erin).unwrap().is_some());
    }

    #[test]
    fn test_pending_for_lists_incoming_only() {
        let (_db, repo) = setup_test_db();
        let alice = user(1);
        let dave = user(4);

        let incoming = repo.pending_for(&alice).unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].requester_id, dave);

        // dave has an incoming pending from carol, not from his own request
        let dave_incoming = repo.pending_for(&dave).unwrap();
        assert_eq!(dave_incoming.len(), 1);
        assert_eq!(dave_incoming[0].requester_id, user(3));
    }
}
