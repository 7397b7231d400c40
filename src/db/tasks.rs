use super::*;

use crate::types::TaskStatus;

impl StudioDb {
    // =========================================================================
    // Follow-up tasks
    // =========================================================================

    /// Insert or refresh a follow-up task keyed on
    /// (owner_id, client_id, rule_key, due_date).
    ///
    /// On conflict only the descriptive fields (title, details, priority) and
    /// `updated_at` change. `status` and `resolved_at` are left alone: a task
    /// the owner already marked done or dismissed stays that way even when
    /// the same risk fires again on the same day. A later due_date is a new
    /// key and therefore a new row.
    ///
    /// Returns the affected-row count (1 for insert and for update).
    pub fn upsert_task(&self, task: &FollowUpTaskInsert) -> Result<usize, DbError> {
        let id = format!("task-{}", uuid::Uuid::new_v4());
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "INSERT INTO follow_up_tasks
                 (id, owner_id, client_id, rule_key, title, details, priority,
                  status, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'open', ?8, ?9, ?9)
             ON CONFLICT(owner_id, client_id, rule_key, due_date) DO UPDATE SET
                 title = excluded.title,
                 details = excluded.details,
                 priority = excluded.priority,
                 updated_at = excluded.updated_at",
            params![
                id,
                task.owner_id,
                task.client_id,
                task.rule_key,
                task.title,
                task.details,
                task.priority.as_str(),
                task.due_date,
                now,
            ],
        )?;
        Ok(changed)
    }

    /// Transition a task's status. Moving into done or dismissed stamps
    /// `resolved_at`; moving back out clears it.
    pub fn set_task_status(
        &self,
        owner_id: &str,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339();
        let resolved_at = if status.is_resolved() {
            Some(now.clone())
        } else {
            None
        };
        self.conn.execute(
            "UPDATE follow_up_tasks
             SET status = ?1, updated_at = ?2, resolved_at = ?3
             WHERE owner_id = ?4 AND id = ?5",
            params![status.as_str(), now, resolved_at, owner_id, task_id],
        )?;
        Ok(())
    }

    /// Open and in-progress follow-ups for an owner, soonest due first, with
    /// the client display name joined in.
    pub fn list_open_tasks(&self, owner_id: &str) -> Result<Vec<DbFollowUpTask>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.owner_id, t.client_id, t.rule_key, t.title, t.details,
                    t.priority, t.status, t.due_date, t.created_at, t.updated_at,
                    t.resolved_at, c.full_name AS client_name
             FROM follow_up_tasks t
             LEFT JOIN clients c ON t.client_id = c.id
             WHERE t.owner_id = ?1
               AND t.status IN ('open', 'in_progress')
             ORDER BY t.due_date, t.priority, t.created_at",
        )?;

        let rows = stmt.query_map(params![owner_id], Self::map_task_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    fn map_task_row(row: &rusqlite::Row) -> rusqlite::Result<DbFollowUpTask> {
        Ok(DbFollowUpTask {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            client_id: row.get(2)?,
            rule_key: row.get(3)?,
            title: row.get(4)?,
            details: row.get(5)?,
            priority: row.get(6)?,
            status: row.get(7)?,
            due_date: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
            resolved_at: row.get(11)?,
            client_name: row.get(12)?,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
