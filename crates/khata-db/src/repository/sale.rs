//! # Sale Repository
//!
//! Database operations for sale lines, payment-channel records and credit
//! sales.
//!
//! ## Sale Recording
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Slip Lifecycle                               │
//! │                                                                         │
//! │  1. BEGIN TRANSACTION (caller)                                         │
//! │                                                                         │
//! │  2. PER REQUEST LINE                                                   │
//! │     └── insert_line() → row with shared slip_no                        │
//! │                                                                         │
//! │  3. ONE PAYMENT-CHANNEL ROW                                            │
//! │     └── insert_amount() → linked to the slip's FIRST line              │
//! │                                                                         │
//! │  4. IF sum(net_amount) > cash                                          │
//! │     └── insert_credit_sale() → debit = shortfall, FIRST line again     │
//! │                                                                         │
//! │  5. COMMIT (caller) - the slip lands whole or not at all               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::{Amount, CreditSale, NewAmount, NewCreditSale, NewSaleLine, Sale};

const SALE_COLUMNS: &str = r#"
    id, slip_no, date, salesperson, cashier, customer_id, item_id,
    previous_reading, current_reading, qty, unit_rate, net_amount,
    cash, balance
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists all sale lines.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets a single sale line by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all lines of a slip, in insertion order.
    pub async fn list_by_slip(&self, slip_no: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE slip_no = ?1 ORDER BY id"
        ))
        .bind(slip_no)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets the payment-channel rows attached to any line of a slip.
    pub async fn amounts_for_slip(&self, slip_no: &str) -> DbResult<Vec<Amount>> {
        let amounts = sqlx::query_as::<_, Amount>(
            r#"
            SELECT a.id, a.sale_id, a.is_online, a.cash_in_hand,
                   a.bank_name, a.account_number, a.timestamp
            FROM amounts a
            JOIN sales s ON s.id = a.sale_id
            WHERE s.slip_no = ?1
            ORDER BY a.id
            "#,
        )
        .bind(slip_no)
        .fetch_all(&self.pool)
        .await?;

        Ok(amounts)
    }

    /// Gets the credit-sale rows attached to a sale line.
    pub async fn credit_sales_for(&self, sale_id: i64) -> DbResult<Vec<CreditSale>> {
        let credits = sqlx::query_as::<_, CreditSale>(
            r#"
            SELECT id, sale_id, customer_id, debit, description, timestamp
            FROM credit_sales
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(credits)
    }

    /// Inserts a fully computed sale line.
    ///
    /// Takes a connection so the caller can batch the whole slip into one
    /// transaction. The recording date is assigned here.
    pub async fn insert_line(
        &self,
        conn: &mut SqliteConnection,
        line: &NewSaleLine,
    ) -> DbResult<i64> {
        debug!(slip_no = %line.slip_no, item_id = line.item_id, "Inserting sale line");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                slip_no, date, salesperson, cashier, customer_id, item_id,
                previous_reading, current_reading, qty, unit_rate, net_amount,
                cash, balance
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&line.slip_no)
        .bind(now)
        .bind(&line.salesperson)
        .bind(&line.cashier)
        .bind(line.customer_id)
        .bind(line.item_id)
        .bind(line.previous_reading)
        .bind(line.current_reading)
        .bind(line.qty)
        .bind(line.unit_rate)
        .bind(line.net_amount)
        .bind(line.cash)
        .bind(line.balance)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts the slip's payment-channel row.
    pub async fn insert_amount(
        &self,
        conn: &mut SqliteConnection,
        amount: &NewAmount,
    ) -> DbResult<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO amounts (
                sale_id, is_online, cash_in_hand, bank_name, account_number, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(amount.sale_id)
        .bind(amount.is_online)
        .bind(amount.cash_in_hand)
        .bind(&amount.bank_name)
        .bind(&amount.account_number)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts the slip's credit-sale row.
    pub async fn insert_credit_sale(
        &self,
        conn: &mut SqliteConnection,
        credit: &NewCreditSale,
    ) -> DbResult<i64> {
        debug!(sale_id = credit.sale_id, debit = credit.debit, "Recording credit sale");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO credit_sales (
                sale_id, customer_id, debit, description, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(credit.sale_id)
        .bind(credit.customer_id)
        .bind(credit.debit)
        .bind(&credit.description)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Deletes a sale line together with its amounts and credit-sale rows.
    pub async fn delete_with_dependents(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM amounts WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM credit_sales WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id.to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Counts sale lines referencing a customer. Used by the customer
    /// deletion guard.
    pub async fn count_for_customer(&self, customer_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE customer_id = ?1")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Counts sale lines referencing an item. Used by the item deletion
    /// guard.
    pub async fn count_for_item(&self, item_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE item_id = ?1")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use khata_core::{BalanceType, NewCustomer, NewItem};

    async fn seeded_db() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: "Walk-in".to_string(),
                address: None,
                tel: None,
                mobile: None,
                email: None,
                cash_balance: None,
                cash_balance_type: BalanceType::Receivable,
            })
            .await
            .unwrap();

        let item = db
            .items()
            .insert(&NewItem {
                item_type: None,
                item_name: "Petrol".to_string(),
                item_code: "PET-01".to_string(),
                minimum_level: None,
                qty_per_packet: None,
                purchase_rate: Some(1.5),
                sale_rate: Some(2.0),
                wholesale_rate: None,
                sale_discount_percent: None,
                opening_stock: None,
                unit: None,
            })
            .await
            .unwrap();

        (db, customer.id, item.id)
    }

    fn line(customer_id: i64, item_id: i64) -> NewSaleLine {
        NewSaleLine {
            slip_no: "SLIP-1".to_string(),
            salesperson: "Ali".to_string(),
            cashier: "Sara".to_string(),
            customer_id,
            item_id,
            previous_reading: 100.0,
            current_reading: 150.0,
            qty: 50.0,
            unit_rate: 2.0,
            net_amount: 100.0,
            cash: 80.0,
            balance: 20.0,
        }
    }

    #[tokio::test]
    async fn test_slip_roundtrip() {
        let (db, customer_id, item_id) = seeded_db().await;
        let repo = db.sales();

        let mut tx = db.pool().begin().await.unwrap();
        let sale_id = repo.insert_line(&mut tx, &line(customer_id, item_id)).await.unwrap();
        repo.insert_amount(
            &mut tx,
            &NewAmount {
                sale_id,
                is_online: false,
                cash_in_hand: Some(80.0),
                bank_name: None,
                account_number: None,
            },
        )
        .await
        .unwrap();
        repo.insert_credit_sale(
            &mut tx,
            &NewCreditSale {
                sale_id,
                customer_id,
                debit: 20.0,
                description: Some("Credit added for sale".to_string()),
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let lines = repo.list_by_slip("SLIP-1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, 50.0);
        assert_eq!(lines[0].balance, 20.0);

        let amounts = repo.amounts_for_slip("SLIP-1").await.unwrap();
        assert_eq!(amounts.len(), 1);
        assert!(!amounts[0].is_online);
        assert_eq!(amounts[0].cash_in_hand, Some(80.0));

        let credits = repo.credit_sales_for(sale_id).await.unwrap();
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].debit, 20.0);
    }

    #[tokio::test]
    async fn test_delete_with_dependents() {
        let (db, customer_id, item_id) = seeded_db().await;
        let repo = db.sales();

        let mut tx = db.pool().begin().await.unwrap();
        let sale_id = repo.insert_line(&mut tx, &line(customer_id, item_id)).await.unwrap();
        repo.insert_amount(
            &mut tx,
            &NewAmount {
                sale_id,
                is_online: false,
                cash_in_hand: Some(80.0),
                bank_name: None,
                account_number: None,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        repo.delete_with_dependents(sale_id).await.unwrap();
        assert!(repo.get(sale_id).await.unwrap().is_none());
        assert!(repo.amounts_for_slip("SLIP-1").await.unwrap().is_empty());

        assert!(matches!(
            repo.delete_with_dependents(sale_id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_reference_counts() {
        let (db, customer_id, item_id) = seeded_db().await;
        let repo = db.sales();

        assert_eq!(repo.count_for_customer(customer_id).await.unwrap(), 0);

        let mut tx = db.pool().begin().await.unwrap();
        repo.insert_line(&mut tx, &line(customer_id, item_id)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(repo.count_for_customer(customer_id).await.unwrap(), 1);
        assert_eq!(repo.count_for_item(item_id).await.unwrap(), 1);
    }
}
