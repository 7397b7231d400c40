use super::*;

impl StudioDb {
    // =========================================================================
    // Notifications
    // =========================================================================

    /// Insert or refresh a notification keyed on
    /// (owner_id, client_id, notification_type, created_for_date).
    ///
    /// On conflict the title and body are replaced and the row is re-armed:
    /// `is_read` drops back to 0 and `read_at` is cleared, because the risk
    /// is active again today. Rows for earlier dates are different keys and
    /// keep whatever read state they have.
    ///
    /// SQLite treats NULLs as distinct in UNIQUE constraints, so a row with
    /// no client_id never conflicts; the engine always writes client-scoped
    /// notifications.
    ///
    /// Returns the affected-row count (1 for insert and for update).
    pub fn upsert_notification(&self, notification: &NotificationInsert) -> Result<usize, DbError> {
        let id = format!("ntf-{}", uuid::Uuid::new_v4());
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "INSERT INTO notifications
                 (id, owner_id, client_id, notification_type, title, body,
                  created_for_date, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
             ON CONFLICT(owner_id, client_id, notification_type, created_for_date) DO UPDATE SET
                 title = excluded.title,
                 body = excluded.body,
                 is_read = 0,
                 read_at = NULL",
            params![
                id,
                notification.owner_id,
                notification.client_id,
                notification.notification_type,
                notification.title,
                notification.body,
                notification.created_for_date,
                now,
            ],
        )?;
        Ok(changed)
    }

    /// Mark a notification read with the current timestamp.
    pub fn mark_notification_read(
        &self,
        owner_id: &str,
        notification_id: &str,
    ) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE notifications SET is_read = 1, read_at = ?1
             WHERE owner_id = ?2 AND id = ?3",
            params![now, owner_id, notification_id],
        )?;
        Ok(())
    }

    /// Unread notifications for an owner, newest signal date first.
    pub fn list_unread_notifications(&self, owner_id: &str) -> Result<Vec<DbNotification>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, client_id, notification_type, title, body,
                    created_for_date, is_read, created_at, read_at
             FROM notifications
             WHERE owner_id = ?1 AND is_read = 0
             ORDER BY created_for_date DESC, created_at DESC",
        )?;

        let rows = stmt.query_map(params![owner_id], Self::map_notification_row)?;

        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?);
        }
        Ok(notifications)
    }

    fn map_notification_row(row: &rusqlite::Row) -> rusqlite::Result<DbNotification> {
        Ok(DbNotification {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            client_id: row.get(2)?,
            notification_type: row.get(3)?,
            title: row.get(4)?,
            body: row.get(5)?,
            created_for_date: row.get(6)?,
            is_read: row.get(7)?,
            created_at: row.get(8)?,
            read_at: row.get(9)?,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::db::test_utils::test_db;
    use crate::db::NotificationInsert;

    fn risk_notification<'a>(date: &'a str, title: &'a str) -> NotificationInsert<'a> {
        NotificationInsert {
            owner_id: "o1",
            client_id: Some("cl-a"),
            notification_type: "no_show_risk",
            title,
            body: Some("2 no-shows in the last 4 weeks"),
            created_for_date: date,
        }
    }

    #[test]
    fn test_second_upsert_updates_in_place() {
        let db = test_db();
        assert_eq!(
            db.upsert_notification(&risk_notification("2026-03-10", "Dana: no-show risk"))
                .expect("upsert"),
            1
        );
        assert_eq!(
            db.upsert_notification(&risk_notification("2026-03-10", "Dana: still at risk"))
                .expect("re-upsert"),
            1
        );

        let count: i32 = db
            .conn_ref()
            .query_row("SELECT COUNT(*) FROM notifications", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);

        let title: String = db
            .conn_ref()
            .query_row("SELECT title FROM notifications", [], |row| row.get(0))
            .expect("title");
        assert_eq!(title, "Dana: still at risk");
    }

    #[test]
    fn test_re_upsert_re_arms_read_state() {
        let db = test_db();
        db.upsert_notification(&risk_notification("2026-03-10", "Dana: no-show risk"))
            .expect("upsert");

        let unread = db.list_unread_notifications("o1").expect("list");
        assert_eq!(unread.len(), 1);
        db.mark_notification_read("o1", &unread[0].id).expect("mark read");
        assert!(db.list_unread_notifications("o1").expect("list").is_empty());

        // Same key fires again: the row comes back unread with no read_at.
        db.upsert_notification(&risk_notification("2026-03-10", "Dana: no-show risk"))
            .expect("re-upsert");
        let unread = db.list_unread_notifications("o1").expect("list");
        assert_eq!(unread.len(), 1);
        assert!(unread[0].read_at.is_none());
    }

    #[test]
    fn test_new_date_is_a_new_row_and_old_read_state_sticks() {
        let db = test_db();
        db.upsert_notification(&risk_notification("2026-03-10", "Dana: no-show risk"))
            .expect("day one");
        let unread = db.list_unread_notifications("o1").expect("list");
        db.mark_notification_read("o1", &unread[0].id).expect("mark read");

        db.upsert_notification(&risk_notification("2026-03-11", "Dana: no-show risk"))
            .expect("day two");

        let count: i32 = db
            .conn_ref()
            .query_row("SELECT COUNT(*) FROM notifications", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 2);

        // Only the new day's row is unread; the read row stays read.
        let unread = db.list_unread_notifications("o1").expect("list");
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].created_for_date, "2026-03-11");
    }

    #[test]
    fn test_unread_listing_is_owner_scoped() {
        let db = test_db();
        db.upsert_notification(&risk_notification("2026-03-10", "Dana: no-show risk"))
            .expect("o1");
        db.upsert_notification(&NotificationInsert {
            owner_id: "o2",
            ..risk_notification("2026-03-10", "Other owner")
        })
        .expect("o2");

        let unread = db.list_unread_notifications("o1").expect("list");
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Dana: no-show risk");
    }
}
