use super::*;

impl StudioDb {
    // =========================================================================
    // Monthly payments
    // =========================================================================

    /// Record a monthly package payment row. `month_start` must be the first
    /// of the month (`%Y-%m-01`); the UNIQUE constraint on
    /// (owner, client, month) rejects a second row for the same month.
    pub fn insert_payment(&self, payment: &PaymentInsert) -> Result<String, DbError> {
        let id = format!("pay-{}", uuid::Uuid::new_v4());
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO payment_records
                 (id, owner_id, client_id, month_start, lesson_count, price,
                  paid, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                payment.owner_id,
                payment.client_id,
                payment.month_start,
                payment.lesson_count,
                payment.price,
                payment.paid,
                payment.notes,
                now,
            ],
        )?;
        Ok(id)
    }

    /// Flip the paid flag on a payment row.
    pub fn set_payment_paid(
        &self,
        owner_id: &str,
        payment_id: &str,
        paid: bool,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE payment_records SET paid = ?1 WHERE owner_id = ?2 AND id = ?3",
            params![paid, owner_id, payment_id],
        )?;
        Ok(())
    }

    /// All payment rows for an owner covering one month.
    pub fn list_payments_for_month(
        &self,
        owner_id: &str,
        month_start: &str,
    ) -> Result<Vec<DbPaymentRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, client_id, month_start, lesson_count, price,
                    paid, notes, created_at
             FROM payment_records
             WHERE owner_id = ?1 AND month_start = ?2
             ORDER BY created_at",
        )?;

        let rows = stmt.query_map(params![owner_id, month_start], Self::map_payment_row)?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row?);
        }
        Ok(payments)
    }

    fn map_payment_row(row: &rusqlite::Row) -> rusqlite::Result<DbPaymentRecord> {
        Ok(DbPaymentRecord {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            client_id: row.get(2)?,
            month_start: row.get(3)?,
            lesson_count: row.get(4)?,
            price: row.get(5)?,
            paid: row.get(6)?,
            notes: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
