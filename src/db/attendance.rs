use super::*;

use crate::types::AttendanceStatus;

impl StudioDb {
    // =========================================================================
    // Attendance
    // =========================================================================

    /// Record a session outcome. Returns the generated id.
    pub fn insert_attendance(&self, record: &AttendanceInsert) -> Result<String, DbError> {
        let id = format!("att-{}", uuid::Uuid::new_v4());
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO attendance_records
                 (id, owner_id, client_id, session_date, time_of_day,
                  duration_minutes, bed_type, status, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                record.owner_id,
                record.client_id,
                record.session_date,
                record.time_of_day,
                record.duration_minutes,
                record.bed_type.as_str(),
                record.status.as_str(),
                record.notes,
                now,
            ],
        )?;
        Ok(id)
    }

    /// Attendance rows for an owner with `session_date` in the inclusive
    /// range `[date_from, date_to]`, optionally restricted to one status.
    ///
    /// Dates are `%Y-%m-%d` TEXT, so lexicographic comparison is date
    /// comparison.
    pub fn list_attendance(
        &self,
        owner_id: &str,
        date_from: &str,
        date_to: &str,
        status: Option<AttendanceStatus>,
    ) -> Result<Vec<DbAttendanceRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, client_id, session_date, time_of_day,
                    duration_minutes, bed_type, status, notes, created_at
             FROM attendance_records
             WHERE owner_id = ?1
               AND session_date >= ?2
               AND session_date <= ?3
               AND (?4 IS NULL OR status = ?4)
             ORDER BY session_date, created_at",
        )?;

        let status_param = status.map(|s| s.as_str());
        let rows = stmt.query_map(
            params![owner_id, date_from, date_to, status_param],
            Self::map_attendance_row,
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn map_attendance_row(row: &rusqlite::Row) -> rusqlite::Result<DbAttendanceRecord> {
        Ok(DbAttendanceRecord {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            client_id: row.get(2)?,
            session_date: row.get(3)?,
            time_of_day: row.get(4)?,
            duration_minutes: row.get(5)?,
            bed_type: row.get(6)?,
            status: row.get(7)?,
            notes: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::db::test_utils::test_db;
    use crate::db::{AttendanceInsert, StudioDb};
    use crate::types::{AttendanceStatus, BedType};

    fn seed_session(db: &StudioDb, owner: &str, client: &str, date: &str, status: AttendanceStatus) {
        db.insert_attendance(&AttendanceInsert {
            owner_id: owner,
            client_id: client,
            session_date: date,
            time_of_day: Some("09:00"),
            duration_minutes: Some(50),
            bed_type: BedType::Reformer,
            status,
            notes: None,
        })
        .expect("insert attendance");
    }

    #[test]
    fn test_range_is_inclusive_on_both_ends() {
        let db = test_db();
        seed_session(&db, "o1", "cl-a", "2026-03-01", AttendanceStatus::Attended);
        seed_session(&db, "o1", "cl-a", "2026-03-15", AttendanceStatus::Attended);
        seed_session(&db, "o1", "cl-a", "2026-03-31", AttendanceStatus::Attended);
        seed_session(&db, "o1", "cl-a", "2026-04-01", AttendanceStatus::Attended);

        let rows = db
            .list_attendance("o1", "2026-03-01", "2026-03-31", None)
            .expect("list");
        let dates: Vec<&str> = rows.iter().map(|r| r.session_date.as_str()).collect();
        assert_eq!(dates, vec!["2026-03-01", "2026-03-15", "2026-03-31"]);
    }

    #[test]
    fn test_status_filter() {
        let db = test_db();
        seed_session(&db, "o1", "cl-a", "2026-03-02", AttendanceStatus::Attended);
        seed_session(&db, "o1", "cl-a", "2026-03-03", AttendanceStatus::NoShow);
        seed_session(&db, "o1", "cl-a", "2026-03-04", AttendanceStatus::Canceled);

        let no_shows = db
            .list_attendance("o1", "2026-03-01", "2026-03-31", Some(AttendanceStatus::NoShow))
            .expect("list");
        assert_eq!(no_shows.len(), 1);
        assert_eq!(no_shows[0].status, "no_show");

        let all = db
            .list_attendance("o1", "2026-03-01", "2026-03-31", None)
            .expect("list");
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_listing_is_owner_scoped() {
        let db = test_db();
        seed_session(&db, "o1", "cl-a", "2026-03-02", AttendanceStatus::NoShow);
        seed_session(&db, "o2", "cl-b", "2026-03-02", AttendanceStatus::NoShow);

        let rows = db
            .list_attendance("o1", "2026-03-01", "2026-03-31", None)
            .expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].client_id, "cl-a");
    }
}
