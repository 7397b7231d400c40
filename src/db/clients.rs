use super::*;

impl StudioDb {
    // =========================================================================
    // Clients
    // =========================================================================

    /// Register a new client for an owner. Returns the generated id.
    pub fn insert_client(
        &self,
        owner_id: &str,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<String, DbError> {
        let id = format!("cl-{}", uuid::Uuid::new_v4());
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO clients (id, owner_id, full_name, phone, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![id, owner_id, full_name, phone, now],
        )?;
        Ok(id)
    }

    /// Activate or deactivate a client. Inactive clients drop out of the
    /// no-show and attendance-drop scans on the next refresh.
    pub fn set_client_active(
        &self,
        owner_id: &str,
        client_id: &str,
        active: bool,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE clients SET is_active = ?1 WHERE owner_id = ?2 AND id = ?3",
            params![active, owner_id, client_id],
        )?;
        Ok(())
    }

    /// All active clients for an owner, ordered by name.
    pub fn list_active_clients(&self, owner_id: &str) -> Result<Vec<DbClient>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, full_name, phone, is_active, created_at
             FROM clients
             WHERE owner_id = ?1 AND is_active = 1
             ORDER BY full_name",
        )?;

        let rows = stmt.query_map(params![owner_id], Self::map_client_row)?;

        let mut clients = Vec::new();
        for row in rows {
            clients.push(row?);
        }
        Ok(clients)
    }

    fn map_client_row(row: &rusqlite::Row) -> rusqlite::Result<DbClient> {
        Ok(DbClient {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            full_name: row.get(2)?,
            phone: row.get(3)?,
            is_active: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
