//! # Purchase Repository
//!
//! Database operations for purchase lines and bill numbers.
//!
//! ## Purchase Recording
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Purchase Batch Lifecycle                            │
//! │                                                                         │
//! │  1. BEGIN TRANSACTION (caller)                                         │
//! │                                                                         │
//! │  2. PER REQUEST LINE                                                   │
//! │     ├── mint_bill_no() → ITEM_1700000000_X7K2Q9                        │
//! │     │   (retries on collision, sees uncommitted lines of this batch)   │
//! │     └── insert_line() → row with shared purchase_no                    │
//! │                                                                         │
//! │  3. COMMIT (caller) - all lines land or none do                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::billing::{format_bill_no, BILL_NO_SUFFIX_LEN};
use khata_core::{NewPurchaseLine, Purchase, MAX_BILL_NO_ATTEMPTS};

const PURCHASE_COLUMNS: &str = r#"
    id, purchase_no, bill_no, date, supplier_id, item_id,
    qty, purchase_rate, sale_rate, net_amount, description,
    discount_percent, discount, payment, balance
"#;

/// A purchase line joined with its catalog names, for read endpoints.
///
/// The joins are LEFT JOINs: a deleted supplier or item leaves the name
/// NULL, and the route layer substitutes a placeholder.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PurchaseRecord {
    pub id: i64,
    pub purchase_no: String,
    pub bill_no: String,
    pub date: chrono::DateTime<Utc>,
    pub supplier_name: Option<String>,
    pub item_id: Option<i64>,
    pub item_name: Option<String>,
    pub qty: f64,
    pub purchase_rate: f64,
    pub sale_rate: f64,
    pub net_amount: f64,
    pub description: Option<String>,
    pub discount_percent: f64,
    pub discount: f64,
    pub payment: f64,
    pub balance: f64,
}

const RECORD_QUERY: &str = r#"
    SELECT
        p.id, p.purchase_no, p.bill_no, p.date,
        s.name AS supplier_name,
        p.item_id, i.item_name AS item_name,
        p.qty, p.purchase_rate, p.sale_rate, p.net_amount, p.description,
        p.discount_percent, p.discount, p.payment, p.balance
    FROM purchases p
    LEFT JOIN suppliers s ON s.id = p.supplier_id
    LEFT JOIN items i ON i.id = p.item_id
"#;

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Lists all purchase lines with joined catalog names.
    pub async fn list(&self) -> DbResult<Vec<PurchaseRecord>> {
        let records =
            sqlx::query_as::<_, PurchaseRecord>(&format!("{RECORD_QUERY} ORDER BY p.id"))
                .fetch_all(&self.pool)
                .await?;

        Ok(records)
    }

    /// Gets a single purchase line by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Gets all lines sharing a purchase number, with joined catalog names.
    pub async fn list_by_purchase_no(&self, purchase_no: &str) -> DbResult<Vec<PurchaseRecord>> {
        let records = sqlx::query_as::<_, PurchaseRecord>(&format!(
            "{RECORD_QUERY} WHERE p.purchase_no = ?1 ORDER BY p.id"
        ))
        .bind(purchase_no)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Inserts a fully computed purchase line.
    ///
    /// Takes a connection so the caller can batch several lines into one
    /// transaction. The recording date is assigned here.
    pub async fn insert_line(
        &self,
        conn: &mut SqliteConnection,
        line: &NewPurchaseLine,
    ) -> DbResult<i64> {
        debug!(bill_no = %line.bill_no, purchase_no = %line.purchase_no, "Inserting purchase line");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO purchases (
                purchase_no, bill_no, date, supplier_id, item_id,
                qty, purchase_rate, sale_rate, net_amount, description,
                discount_percent, discount, payment, balance
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&line.purchase_no)
        .bind(&line.bill_no)
        .bind(now)
        .bind(line.supplier_id)
        .bind(line.item_id)
        .bind(line.qty)
        .bind(line.purchase_rate)
        .bind(line.sale_rate)
        .bind(line.net_amount)
        .bind(&line.description)
        .bind(line.discount_percent)
        .bind(line.discount)
        .bind(line.payment)
        .bind(line.balance)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Mints a fresh, unique bill number for an item.
    ///
    /// Checks the connection (so uncommitted lines of the current batch are
    /// visible) and retries with a new random suffix on collision. Gives up
    /// after [`MAX_BILL_NO_ATTEMPTS`] tries.
    pub async fn mint_bill_no(
        &self,
        conn: &mut SqliteConnection,
        item_name: &str,
    ) -> DbResult<String> {
        for _ in 0..MAX_BILL_NO_ATTEMPTS {
            let candidate = generate_bill_no(item_name);

            let exists: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE bill_no = ?1")
                    .bind(&candidate)
                    .fetch_one(&mut *conn)
                    .await?;

            if exists == 0 {
                return Ok(candidate);
            }
            debug!(bill_no = %candidate, "Bill number collision, regenerating");
        }

        Err(DbError::Internal(format!(
            "could not mint a unique bill number after {MAX_BILL_NO_ATTEMPTS} attempts"
        )))
    }

    /// Deletes a single purchase line.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM purchases WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", id.to_string()));
        }

        Ok(())
    }

    /// Counts purchase lines referencing an item. Used by the item deletion
    /// guard.
    pub async fn count_for_item(&self, item_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE item_id = ?1")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts purchase lines referencing a supplier. Used by the supplier
    /// deletion guard.
    pub async fn count_for_supplier(&self, supplier_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE supplier_id = ?1")
                .bind(supplier_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Generates a bill number candidate: the first three letters of the item
/// name, the current unix timestamp, and a random uppercase-alphanumeric
/// suffix.
///
/// ## Example
/// `PET_1700000000_X7K2Q9`
fn generate_bill_no(item_name: &str) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let mut rng = rand::thread_rng();
    let suffix: String = (0..BILL_NO_SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    format_bill_no(item_name, Utc::now().timestamp(), &suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================
