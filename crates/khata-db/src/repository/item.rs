//! # Item Repository
//!
//! CRUD and lookup operations for stocked items.
//!
//! Purchase recording resolves items by exact `item_name`, so the name
//! lookup lives here next to the id lookup.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::{Item, NewItem};

const ITEM_COLUMNS: &str = r#"
    id, type, item_name, item_code,
    minimum_level, qty_per_packet,
    purchase_rate, sale_rate, wholesale_rate, sale_discount_percent,
    opening_stock, unit
"#;

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Lists all items, newest registration first.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an item by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an item by its exact display name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE item_name = ?1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts a new item and returns the stored row.
    pub async fn insert(&self, item: &NewItem) -> DbResult<Item> {
        debug!(item_name = %item.item_name, "Inserting item");

        let result = sqlx::query(
            r#"
            INSERT INTO items (
                type, item_name, item_code,
                minimum_level, qty_per_packet,
                purchase_rate, sale_rate, wholesale_rate, sale_discount_percent,
                opening_stock, unit
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.item_type)
        .bind(&item.item_name)
        .bind(&item.item_code)
        .bind(item.minimum_level)
        .bind(item.qty_per_packet)
        .bind(item.purchase_rate)
        .bind(item.sale_rate)
        .bind(item.wholesale_rate)
        .bind(item.sale_discount_percent)
        .bind(item.opening_stock)
        .bind(&item.unit)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id.to_string()))
    }

    /// Fully replaces an item's fields.
    pub async fn update(&self, id: i64, item: &NewItem) -> DbResult<Item> {
        let result = sqlx::query(
            r#"
            UPDATE items SET
                type = ?2, item_name = ?3, item_code = ?4,
                minimum_level = ?5, qty_per_packet = ?6,
                purchase_rate = ?7, sale_rate = ?8,
                wholesale_rate = ?9, sale_discount_percent = ?10,
                opening_stock = ?11, unit = ?12
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&item.item_type)
        .bind(&item.item_name)
        .bind(&item.item_code)
        .bind(item.minimum_level)
        .bind(item.qty_per_packet)
        .bind(item.purchase_rate)
        .bind(item.sale_rate)
        .bind(item.wholesale_rate)
        .bind(item.sale_discount_percent)
        .bind(item.opening_stock)
        .bind(&item.unit)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id.to_string()));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id.to_string()))
    }

    /// Deletes an item.
    ///
    /// Callers must check purchase/sale references first; this method only
    /// removes the row.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id.to_string()));
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

    fn petrol() -> NewItem {
        NewItem {
            item_type: Some("fuel".to_string()),
            item_name: "Petrol".to_string(),
            item_code: "PET-01".to_string(),
            minimum_level: Some(10),
            qty_per_packet: None,
            purchase_rate: Some(1.5),
            sale_rate: Some(2.0),
            wholesale_rate: None,
            sale_discount_percent: None,
            opening_stock: Some(100.0),
            unit: Some("litre".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let item = repo.insert(&petrol()).await.unwrap();
        assert!(item.id > 0);
        assert_eq!(item.item_name, "Petrol");
        assert_eq!(item.sale_rate, Some(2.0));

        let by_name = repo.get_by_name("Petrol").await.unwrap().unwrap();
        assert_eq!(by_name.id, item.id);

        assert!(repo.get_by_name("Diesel").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let item = repo.insert(&petrol()).await.unwrap();

        let mut changed = petrol();
        changed.sale_rate = Some(2.5);
        let updated = repo.update(item.id, &changed).await.unwrap();
        assert_eq!(updated.sale_rate, Some(2.5));

        repo.delete(item.id).await.unwrap();
        assert!(repo.get(item.id).await.unwrap().is_none());

        // Deleting again reports not found.
        assert!(matches!(
            repo.delete(item.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
