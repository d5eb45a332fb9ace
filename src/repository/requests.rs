//! Equipment requests repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    inventory::{remove_stock, StockRemoval},
    models::{
        enums::RequestStatus,
        request::{
            CreateEquipmentRequest, EquipmentRequest, EquipmentRequestDetails, RequestQuery,
            UpdateEquipmentRequest,
        },
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a pending request
    pub async fn create(
        &self,
        site_id: i32,
        supervisor_id: Uuid,
        data: &CreateEquipmentRequest,
    ) -> AppResult<EquipmentRequest> {
        let row = sqlx::query_as::<_, EquipmentRequest>(
            r#"
            INSERT INTO equipment_requests
                (site_id, supervisor_id, request_type, equipment_id, equipment_name, quantity, is_rental, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(site_id)
        .bind(supervisor_id)
        .bind(data.request_type)
        .bind(data.equipment_id)
        .bind(data.equipment_name.as_deref().map(str::trim))
        .bind(data.quantity)
        .bind(data.is_rental)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// List requests newest first, optionally for one supervisor only
    pub async fn list(
        &self,
        query: &RequestQuery,
        supervisor_id: Option<Uuid>,
    ) -> AppResult<Vec<EquipmentRequestDetails>> {
        let rows = sqlx::query_as::<_, EquipmentRequestDetails>(
            r#"
            SELECT r.id, r.site_id, s.site_name,
                   r.supervisor_id, u.username AS supervisor_username, u.email AS supervisor_email,
                   r.request_type, r.equipment_id,
                   COALESCE(r.equipment_name, e.name) AS equipment_name,
                   r.quantity, r.is_rental, r.status, r.decided_at, r.created_at
            FROM equipment_requests r
            LEFT JOIN construction_sites s ON s.id = r.site_id
            LEFT JOIN users u ON u.id = r.supervisor_id
            LEFT JOIN equipment e ON e.id = r.equipment_id
            WHERE ($1::text IS NULL OR r.status = $1)
              AND ($2::uuid IS NULL OR r.supervisor_id = $2)
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(query.status)
        .bind(supervisor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<EquipmentRequest> {
        sqlx::query_as::<_, EquipmentRequest>("SELECT * FROM equipment_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Edit a pending request
    pub async fn update_pending(&self, id: i32, data: &UpdateEquipmentRequest) -> AppResult<EquipmentRequest> {
        let mut tx = self.pool.begin().await?;
        let request = Self::lock_pending(&mut tx, id).await?;
        data.check_against(request.request_type)?;

        let row = sqlx::query_as::<_, EquipmentRequest>(
            r#"
            UPDATE equipment_requests
            SET equipment_name = COALESCE($1, equipment_name),
                quantity = COALESCE($2, quantity),
                is_rental = COALESCE($3, is_rental)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(data.equipment_name.as_deref().map(str::trim))
        .bind(data.quantity)
        .bind(data.is_rental)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Approve a pending request and apply its stock change, all in one
    /// transaction.
    pub async fn approve(&self, id: i32, admin_id: Uuid) -> AppResult<EquipmentRequest> {
        let mut tx = self.pool.begin().await?;
        let request = Self::lock_pending(&mut tx, id).await?;

        if request.request_type.adds_stock() {
            Self::add_stock(&mut tx, &request).await?;
        } else {
            Self::take_stock(&mut tx, &request).await?;
        }

        let row = Self::set_status(&mut tx, id, RequestStatus::Approved, admin_id).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Reject a pending request
    pub async fn reject(&self, id: i32, admin_id: Uuid) -> AppResult<EquipmentRequest> {
        let mut tx = self.pool.begin().await?;
        Self::lock_pending(&mut tx, id).await?;
        let row = Self::set_status(&mut tx, id, RequestStatus::Rejected, admin_id).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Count pending requests (for stats)
    pub async fn count_pending(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM equipment_requests WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn lock_pending(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<EquipmentRequest> {
        let request = sqlx::query_as::<_, EquipmentRequest>(
            "SELECT * FROM equipment_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::BusinessRule(format!(
                "Request {} is already {}",
                id, request.status
            )));
        }
        Ok(request)
    }

    async fn set_status(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: i32,
        status: RequestStatus,
        admin_id: Uuid,
    ) -> AppResult<EquipmentRequest> {
        let row = sqlx::query_as::<_, EquipmentRequest>(
            r#"
            UPDATE equipment_requests
            SET status = $1, decided_by = $2, decided_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(admin_id)
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    /// buy: grow the matching line or open a new one
    async fn add_stock(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        request: &EquipmentRequest,
    ) -> AppResult<()> {
        let name = match (&request.equipment_name, request.equipment_id) {
            (Some(name), _) => name.clone(),
            (None, Some(equipment_id)) => sqlx::query_scalar::<_, String>(
                "SELECT name FROM equipment WHERE id = $1",
            )
            .bind(equipment_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::BusinessRule("Equipment name not found".to_string()))?,
            (None, None) => {
                return Err(AppError::BusinessRule("Equipment name not found".to_string()));
            }
        };
        let existing: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT id FROM equipment
            WHERE site_id = $1 AND name = $2 AND is_rental = $3
            ORDER BY id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(request.site_id)
        .bind(&name)
        .bind(request.is_rental)
        .fetch_optional(&mut **tx)
        .await?;

        match existing {
            Some(equipment_id) => {
                sqlx::query(
                    "UPDATE equipment SET quantity = quantity + $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(request.quantity)
                .bind(equipment_id)
                .execute(&mut **tx)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO equipment (name, site_id, quantity, is_rental, status, date_bought)
                    VALUES ($1, $2, $3, $4, 'available', NOW())
                    "#,
                )
                .bind(&name)
                .bind(request.site_id)
                .bind(request.quantity)
                .bind(request.is_rental)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }

    /// sell / rent / return: shrink the referenced row, deleting it when
    /// emptied. The row must still be held by the requesting site.
    async fn take_stock(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        request: &EquipmentRequest,
    ) -> AppResult<()> {
        let equipment_id = request.equipment_id.ok_or_else(|| {
            AppError::BusinessRule(format!(
                "Equipment not found for {} request",
                request.request_type
            ))
        })?;

        let (site_id, current): (Option<i32>, i32) =
            sqlx::query_as("SELECT site_id, quantity FROM equipment WHERE id = $1 FOR UPDATE")
                .bind(equipment_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", equipment_id)))?;

        if site_id != Some(request.site_id) {
            return Err(AppError::BusinessRule(format!(
                "Equipment {} is no longer at the requesting site",
                equipment_id
            )));
        }

        match remove_stock(current, request.quantity)? {
            StockRemoval::Delete => {
                sqlx::query("DELETE FROM equipment WHERE id = $1")
                    .bind(equipment_id)
                    .execute(&mut **tx)
                    .await?;
            }
            StockRemoval::Keep(quantity) => {
                sqlx::query("UPDATE equipment SET quantity = $1, updated_at = NOW() WHERE id = $2")
                    .bind(quantity)
                    .bind(equipment_id)
                    .execute(&mut **tx)
                    .await?;
            }
        }
        Ok(())
    }
}
