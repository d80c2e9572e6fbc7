//! # Supplier Repository
//!
//! CRUD and lookup operations for suppliers.
//!
//! Purchase recording resolves suppliers by exact `name`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::{NewSupplier, Supplier};

const SUPPLIER_COLUMNS: &str =
    "id, name, address, tel, mobile, email, cash_balance, cash_balance_type";

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists all suppliers, newest first.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Gets a supplier by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Gets a supplier by its exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE name = ?1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Inserts a new supplier and returns the stored row.
    pub async fn insert(&self, supplier: &NewSupplier) -> DbResult<Supplier> {
        debug!(name = %supplier.name, "Inserting supplier");

        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (
                name, address, tel, mobile, email,
                cash_balance, cash_balance_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.tel)
        .bind(&supplier.mobile)
        .bind(&supplier.email)
        .bind(supplier.cash_balance)
        .bind(supplier.cash_balance_type)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id.to_string()))
    }

    /// Fully replaces a supplier's fields.
    pub async fn update(&self, id: i64, supplier: &NewSupplier) -> DbResult<Supplier> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2, address = ?3, tel = ?4, mobile = ?5, email = ?6,
                cash_balance = ?7, cash_balance_type = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&supplier.name)
        .bind(&supplier.address)
        .bind(&supplier.tel)
        .bind(&supplier.mobile)
        .bind(&supplier.email)
        .bind(supplier.cash_balance)
        .bind(supplier.cash_balance_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id.to_string()));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id.to_string()))
    }

    /// Deletes a supplier.
    ///
    /// Callers must check purchase references first.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id.to_string()));
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
    use khata_core::BalanceType;

    fn acme() -> NewSupplier {
        NewSupplier {
            name: "Acme Fuels".to_string(),
            address: Some("Main Rd".to_string()),
            tel: None,
            mobile: Some("0300-1234567".to_string()),
            email: None,
            cash_balance: Some(500.0),
            cash_balance_type: BalanceType::Payable,
        }
    }

    #[tokio::test]
    async fn test_insert_lookup_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        let supplier = repo.insert(&acme()).await.unwrap();
        assert_eq!(supplier.cash_balance_type, BalanceType::Payable);

        let by_name = repo.get_by_name("Acme Fuels").await.unwrap().unwrap();
        assert_eq!(by_name.id, supplier.id);
        assert!(repo.get_by_name("Nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_supplier() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        assert!(matches!(
            repo.update(999, &acme()).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
