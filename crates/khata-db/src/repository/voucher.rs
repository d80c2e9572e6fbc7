//! # Voucher Repository
//!
//! Database operations for credit and debit voucher lines.
//!
//! A voucher is a batch of account lines sharing one `voucher_no`. Credit
//! and debit vouchers are separate tables with mirrored shapes: a credit
//! voucher debits its account lines against one credit account, a debit
//! voucher credits its lines against one debit account.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::{CreditVoucher, DebitVoucher};

const CREDIT_COLUMNS: &str =
    "id, voucher_no, date, cr_account, account_code, account_name, debit, description";

const DEBIT_COLUMNS: &str =
    "id, voucher_no, date, db_account, account_code, account_name, credit, description";

/// One account line of a credit voucher, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCreditVoucherLine {
    pub voucher_no: String,
    pub cr_account: String,
    pub account_code: String,
    pub account_name: String,
    pub debit: f64,
    pub description: Option<String>,
}

/// One account line of a debit voucher, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewDebitVoucherLine {
    pub voucher_no: String,
    pub db_account: String,
    pub account_code: String,
    pub account_name: String,
    pub credit: f64,
    pub description: Option<String>,
}

/// Repository for voucher database operations.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    pool: SqlitePool,
}

impl VoucherRepository {
    /// Creates a new VoucherRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VoucherRepository { pool }
    }

    // =========================================================================
    // Credit Vouchers
    // =========================================================================

    /// Lists all credit voucher lines.
    pub async fn list_credit(&self) -> DbResult<Vec<CreditVoucher>> {
        let vouchers = sqlx::query_as::<_, CreditVoucher>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credit_vouchers ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    /// Gets a credit voucher line by ID.
    pub async fn get_credit(&self, id: i64) -> DbResult<Option<CreditVoucher>> {
        let voucher = sqlx::query_as::<_, CreditVoucher>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credit_vouchers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// Gets every credit voucher line sharing a voucher number.
    pub async fn list_credit_by_no(&self, voucher_no: &str) -> DbResult<Vec<CreditVoucher>> {
        let vouchers = sqlx::query_as::<_, CreditVoucher>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credit_vouchers WHERE voucher_no = ?1 ORDER BY id"
        ))
        .bind(voucher_no)
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    /// Inserts one credit voucher line and returns the stored row.
    pub async fn insert_credit(
        &self,
        conn: &mut SqliteConnection,
        line: &NewCreditVoucherLine,
    ) -> DbResult<CreditVoucher> {
        debug!(voucher_no = %line.voucher_no, account_code = %line.account_code, "Inserting credit voucher line");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO credit_vouchers (
                voucher_no, date, cr_account, account_code, account_name,
                debit, description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&line.voucher_no)
        .bind(now)
        .bind(&line.cr_account)
        .bind(&line.account_code)
        .bind(&line.account_name)
        .bind(line.debit)
        .bind(&line.description)
        .execute(&mut *conn)
        .await?;

        let id = result.last_insert_rowid();
        let stored = sqlx::query_as::<_, CreditVoucher>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credit_vouchers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(stored)
    }

    /// Deletes a credit voucher line.
    pub async fn delete_credit(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM credit_vouchers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Voucher", id.to_string()));
        }

        Ok(())
    }

    // =========================================================================
    // Debit Vouchers
    // =========================================================================

    /// Lists all debit voucher lines.
    pub async fn list_debit(&self) -> DbResult<Vec<DebitVoucher>> {
        let vouchers = sqlx::query_as::<_, DebitVoucher>(&format!(
            "SELECT {DEBIT_COLUMNS} FROM debit_vouchers ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    /// Gets a debit voucher line by ID.
    pub async fn get_debit(&self, id: i64) -> DbResult<Option<DebitVoucher>> {
        let voucher = sqlx::query_as::<_, DebitVoucher>(&format!(
            "SELECT {DEBIT_COLUMNS} FROM debit_vouchers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// Gets every debit voucher line sharing a voucher number.
    pub async fn list_debit_by_no(&self, voucher_no: &str) -> DbResult<Vec<DebitVoucher>> {
        let vouchers = sqlx::query_as::<_, DebitVoucher>(&format!(
            "SELECT {DEBIT_COLUMNS} FROM debit_vouchers WHERE voucher_no = ?1 ORDER BY id"
        ))
        .bind(voucher_no)
        .fetch_all(&self.pool)
        .await?;

        Ok(vouchers)
    }

    /// Inserts one debit voucher line and returns the stored row.
    pub async fn insert_debit(
        &self,
        conn: &mut SqliteConnection,
        line: &NewDebitVoucherLine,
    ) -> DbResult<DebitVoucher> {
        debug!(voucher_no = %line.voucher_no, account_code = %line.account_code, "Inserting debit voucher line");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO debit_vouchers (
                voucher_no, date, db_account, account_code, account_name,
                credit, description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&line.voucher_no)
        .bind(now)
        .bind(&line.db_account)
        .bind(&line.account_code)
        .bind(&line.account_name)
        .bind(line.credit)
        .bind(&line.description)
        .execute(&mut *conn)
        .await?;

        let id = result.last_insert_rowid();
        let stored = sqlx::query_as::<_, DebitVoucher>(&format!(
            "SELECT {DEBIT_COLUMNS} FROM debit_vouchers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(stored)
    }

    /// Deletes a debit voucher line.
    pub async fn delete_debit(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM debit_vouchers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Debit Voucher", id.to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn credit_line(code: &str, debit: f64) -> NewCreditVoucherLine {
        NewCreditVoucherLine {
            voucher_no: "CV-1".to_string(),
            cr_account: "in hand".to_string(),
            account_code: code.to_string(),
            account_name: format!("Account {code}"),
            debit,
            description: Some("Month end".to_string()),
        }
    }

    #[tokio::test]
    async fn test_credit_voucher_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.vouchers();

        let mut tx = db.pool().begin().await.unwrap();
        let first = repo.insert_credit(&mut tx, &credit_line("4001", 150.0)).await.unwrap();
        repo.insert_credit(&mut tx, &credit_line("4002", 50.0)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.cr_account, "in hand");

        let batch = repo.list_credit_by_no("CV-1").await.unwrap();
        assert_eq!(batch.len(), 2);
        let total: f64 = batch.iter().map(|v| v.debit).sum();
        assert_eq!(total, 200.0);

        repo.delete_credit(first.id).await.unwrap();
        assert!(repo.get_credit(first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_debit_voucher_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.vouchers();

        let mut tx = db.pool().begin().await.unwrap();
        let line = repo
            .insert_debit(
                &mut tx,
                &NewDebitVoucherLine {
                    voucher_no: "DV-1".to_string(),
                    db_account: "online".to_string(),
                    account_code: "5001".to_string(),
                    account_name: "Rent".to_string(),
                    credit: 300.0,
                    description: None,
                },
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(line.credit, 300.0);
        assert_eq!(repo.list_debit().await.unwrap().len(), 1);
        assert!(matches!(
            repo.delete_debit(999).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
