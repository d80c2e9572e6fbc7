//! Customer repository. Same shape as the supplier repository; sale
//! recording resolves customers by id rather than name.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::{Customer, NewCustomer};

const CUSTOMER_COLUMNS: &str =
    "id, name, address, tel, mobile, email, cash_balance, cash_balance_type";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers, newest first.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer and returns the stored row.
    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<Customer> {
        debug!(name = %customer.name, "Inserting customer");

        let result = sqlx::query(
            r#"
            INSERT INTO customers (
                name, address, tel, mobile, email,
                cash_balance, cash_balance_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.tel)
        .bind(&customer.mobile)
        .bind(&customer.email)
        .bind(customer.cash_balance)
        .bind(customer.cash_balance_type)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id.to_string()))
    }

    /// Fully replaces a customer's fields.
    pub async fn update(&self, id: i64, customer: &NewCustomer) -> DbResult<Customer> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2, address = ?3, tel = ?4, mobile = ?5, email = ?6,
                cash_balance = ?7, cash_balance_type = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.tel)
        .bind(&customer.mobile)
        .bind(&customer.email)
        .bind(customer.cash_balance)
        .bind(customer.cash_balance_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id.to_string()));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id.to_string()))
    }

    /// Deletes a customer.
    ///
    /// Callers must check sale references first.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use khata_core::BalanceType;

    #[tokio::test]
    async fn test_customer_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let customer = repo
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

        assert_eq!(repo.list().await.unwrap().len(), 1);

        repo.delete(customer.id).await.unwrap();
        assert!(repo.get(customer.id).await.unwrap().is_none());
    }
}
