//! Equipment repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::equipment::{CreateEquipment, Equipment, EquipmentWithSite, UpdateEquipment},
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All rows joined with site names, ordered for line grouping
    pub async fn list_with_sites(&self, site_id: Option<i32>) -> AppResult<Vec<EquipmentWithSite>> {
        let rows = sqlx::query_as::<_, EquipmentWithSite>(
            r#"
            SELECT e.id, e.name, e.site_id, s.site_name, e.quantity, e.is_rental
            FROM equipment e
            LEFT JOIN construction_sites s ON s.id = e.site_id
            WHERE ($1::int IS NULL OR e.site_id = $1)
            ORDER BY s.site_name NULLS LAST, e.name, e.is_rental, e.id
            "#,
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Rows held by one site
    pub async fn list_by_site(&self, site_id: i32) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE site_id = $1 ORDER BY name, id",
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (name, site_id, quantity, is_rental, status, date_bought)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(data.site_id)
        .bind(data.quantity)
        .bind(data.is_rental)
        .bind(data.status.unwrap_or_default())
        .bind(data.date_bought.unwrap_or_else(Utc::now))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.site_id, "site_id");
        add_field!(data.quantity, "quantity");
        add_field!(data.is_rental, "is_rental");
        add_field!(data.status, "status");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.site_id);
        bind_field!(data.quantity);
        bind_field!(data.is_rental);
        bind_field!(data.status);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete equipment
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Rewrite the rows of one inventory line: `quantities[i]` goes to
    /// `ids[i]` and every row moves to `site_id`
    pub async fn update_group(
        &self,
        ids: &[i32],
        quantities: &[i32],
        site_id: Option<i32>,
    ) -> AppResult<Vec<Equipment>> {
        let mut tx = self.pool.begin().await?;

        let locked: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM equipment WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(missing) = ids.iter().find(|id| !locked.contains(id)) {
            return Err(AppError::NotFound(format!("Equipment {} not found", missing)));
        }

        let mut rows = Vec::with_capacity(ids.len());
        for (id, quantity) in ids.iter().zip(quantities) {
            let row = sqlx::query_as::<_, Equipment>(
                r#"
                UPDATE equipment
                SET quantity = $1, site_id = $2, updated_at = NOW()
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(quantity)
            .bind(site_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    /// Delete every row in `ids`, returning how many were removed
    pub async fn delete_group(&self, ids: &[i32]) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Sum of quantities over owned or rented equipment (for stats)
    pub async fn total_quantity(&self, rental: bool) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::bigint FROM equipment WHERE is_rental = $1",
        )
        .bind(rental)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
