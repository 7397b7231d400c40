use super::*;

const SETTINGS_COLUMNS: &str = "owner_id, no_show_enabled, attendance_drop_enabled,
        pending_payment_enabled, no_show_threshold, pending_lessons_threshold,
        attendance_drop_ratio, last_refreshed_at, updated_at";

impl StudioDb {
    // =========================================================================
    // Automation settings
    // =========================================================================

    /// Fetch the owner's settings row, creating it with schema defaults on
    /// first access. Every owner gets exactly one row.
    pub fn get_or_create_settings(&self, owner_id: &str) -> Result<DbAutomationSettings, DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO automation_settings (owner_id) VALUES (?1)",
            params![owner_id],
        )?;
        self.read_settings(owner_id)
    }

    /// Settings read used by the refresh engine while it decides whether to
    /// run. The caller must already hold an IMMEDIATE transaction; the write
    /// lock is what keeps a concurrent refresh from reading the same
    /// `last_refreshed_at` and running twice.
    pub fn lock_settings_for_update(&self, owner_id: &str) -> Result<DbAutomationSettings, DbError> {
        self.get_or_create_settings(owner_id)
    }

    /// Stamp the daily-guard timestamp after a completed refresh.
    pub fn save_settings_timestamp(
        &self,
        owner_id: &str,
        last_refreshed_at: &str,
    ) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE automation_settings
             SET last_refreshed_at = ?2, updated_at = ?3
             WHERE owner_id = ?1",
            params![owner_id, last_refreshed_at, now],
        )?;
        Ok(())
    }

    /// Apply threshold/flag changes from the settings editor. Rejects
    /// out-of-range values; the refresh timestamp is not touched.
    pub fn update_settings(
        &self,
        owner_id: &str,
        update: &SettingsUpdate,
    ) -> Result<DbAutomationSettings, DbError> {
        if update.no_show_threshold < 1 {
            return Err(DbError::InvalidSettings(format!(
                "no_show_threshold must be >= 1, got {}",
                update.no_show_threshold
            )));
        }
        if update.pending_lessons_threshold < 1 {
            return Err(DbError::InvalidSettings(format!(
                "pending_lessons_threshold must be >= 1, got {}",
                update.pending_lessons_threshold
            )));
        }
        if !(update.attendance_drop_ratio > 0.0 && update.attendance_drop_ratio <= 1.0) {
            return Err(DbError::InvalidSettings(format!(
                "attendance_drop_ratio must be in (0, 1], got {}",
                update.attendance_drop_ratio
            )));
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO automation_settings (owner_id) VALUES (?1)",
            params![owner_id],
        )?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE automation_settings
             SET no_show_enabled = ?2,
                 attendance_drop_enabled = ?3,
                 pending_payment_enabled = ?4,
                 no_show_threshold = ?5,
                 pending_lessons_threshold = ?6,
                 attendance_drop_ratio = ?7,
                 updated_at = ?8
             WHERE owner_id = ?1",
            params![
                owner_id,
                update.no_show_enabled,
                update.attendance_drop_enabled,
                update.pending_payment_enabled,
                update.no_show_threshold,
                update.pending_lessons_threshold,
                update.attendance_drop_ratio,
                now,
            ],
        )?;
        self.read_settings(owner_id)
    }

    fn read_settings(&self, owner_id: &str) -> Result<DbAutomationSettings, DbError> {
        let settings = self.conn.query_row(
            &format!(
                "SELECT {SETTINGS_COLUMNS} FROM automation_settings WHERE owner_id = ?1"
            ),
            params![owner_id],
            Self::map_settings_row,
        )?;
        Ok(settings)
    }

    fn map_settings_row(row: &rusqlite::Row) -> rusqlite::Result<DbAutomationSettings> {
        Ok(DbAutomationSettings {
            owner_id: row.get(0)?,
            no_show_enabled: row.get(1)?,
            attendance_drop_enabled: row.get(2)?,
            pending_payment_enabled: row.get(3)?,
            no_show_threshold: row.get(4)?,
            pending_lessons_threshold: row.get(5)?,
            attendance_drop_ratio: row.get(6)?,
            last_refreshed_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::db::test_utils::test_db;
    use crate::db::{DbError, SettingsUpdate};

    fn base_update() -> SettingsUpdate {
        SettingsUpdate {
            no_show_enabled: true,
            attendance_drop_enabled: true,
            pending_payment_enabled: true,
            no_show_threshold: 2,
            pending_lessons_threshold: 4,
            attendance_drop_ratio: 0.5,
        }
    }

    #[test]
    fn test_lazy_creation_with_defaults() {
        let db = test_db();
        let settings = db.get_or_create_settings("owner-1").expect("get");
        assert_eq!(settings.owner_id, "owner-1");
        assert!(settings.no_show_enabled);
        assert!(settings.attendance_drop_enabled);
        assert!(settings.pending_payment_enabled);
        assert_eq!(settings.no_show_threshold, 2);
        assert_eq!(settings.pending_lessons_threshold, 4);
        assert!((settings.attendance_drop_ratio - 0.5).abs() < f64::EPSILON);
        assert!(settings.last_refreshed_at.is_none());

        // Second call reads the same row, no duplicate.
        db.get_or_create_settings("owner-1").expect("get again");
        let count: i32 = db
            .conn_ref()
            .query_row(
                "SELECT COUNT(*) FROM automation_settings WHERE owner_id = 'owner-1'",
                [],
                |row| row.get(0),
            )
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_save_timestamp() {
        let db = test_db();
        db.get_or_create_settings("owner-1").expect("create");
        db.save_settings_timestamp("owner-1", "2026-03-10T08:30:00+00:00")
            .expect("save");

        let settings = db.get_or_create_settings("owner-1").expect("read");
        assert_eq!(
            settings.last_refreshed_at.as_deref(),
            Some("2026-03-10T08:30:00+00:00")
        );
    }

    #[test]
    fn test_update_settings_persists() {
        let db = test_db();
        let updated = db
            .update_settings(
                "owner-1",
                &SettingsUpdate {
                    no_show_enabled: false,
                    no_show_threshold: 3,
                    pending_lessons_threshold: 6,
                    attendance_drop_ratio: 0.75,
                    ..base_update()
                },
            )
            .expect("update");
        assert!(!updated.no_show_enabled);
        assert_eq!(updated.no_show_threshold, 3);
        assert_eq!(updated.pending_lessons_threshold, 6);
        assert!((updated.attendance_drop_ratio - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_settings_validates_bounds() {
        let db = test_db();

        let err = db.update_settings(
            "owner-1",
            &SettingsUpdate {
                no_show_threshold: 0,
                ..base_update()
            },
        );
        assert!(matches!(err, Err(DbError::InvalidSettings(_))));

        let err = db.update_settings(
            "owner-1",
            &SettingsUpdate {
                pending_lessons_threshold: 0,
                ..base_update()
            },
        );
        assert!(matches!(err, Err(DbError::InvalidSettings(_))));

        let err = db.update_settings(
            "owner-1",
            &SettingsUpdate {
                attendance_drop_ratio: 0.0,
                ..base_update()
            },
        );
        assert!(matches!(err, Err(DbError::InvalidSettings(_))));

        let err = db.update_settings(
            "owner-1",
            &SettingsUpdate {
                attendance_drop_ratio: 1.5,
                ..base_update()
            },
        );
        assert!(matches!(err, Err(DbError::InvalidSettings(_))));

        // Ratio of exactly 1.0 is allowed.
        db.update_settings(
            "owner-1",
            &SettingsUpdate {
                attendance_drop_ratio: 1.0,
                ..base_update()
            },
        )
        .expect("ratio 1.0 in range");
    }
}
