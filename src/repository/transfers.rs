//! Equipment transfers repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    inventory::{lock_order, plan_transfer, StockRemoval},
    models::{
        enums::TransferStatus,
        equipment::Equipment,
        transfer::{CreateTransfer, EquipmentTransfer, TransferDetails, TransferDirection, TransferQuery},
    },
};

const TRANSFER_DETAILS_SELECT: &str = r#"
    SELECT t.id, t.equipment_id, t.equipment_name, t.is_rental,
           t.from_site_id, fs.site_name AS from_site_name,
           t.to_site_id, ts.site_name AS to_site_name,
           t.requested_by, u.username AS requested_by_username, u.email AS requested_by_email,
           t.quantity, t.status, t.accepted, t.comment, t.vehicle_number, t.remarks,
           t.image_url, t.requested_at, t.decided_at
    FROM equipment_transfers t
    LEFT JOIN construction_sites fs ON fs.id = t.from_site_id
    LEFT JOIN construction_sites ts ON ts.id = t.to_site_id
    LEFT JOIN users u ON u.id = t.requested_by
"#;

#[derive(Clone)]
pub struct TransfersRepository {
    pool: Pool<Postgres>,
}

impl TransfersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record a pending transfer of part of `equipment` to another site
    pub async fn create(
        &self,
        equipment: &Equipment,
        from_site_id: i32,
        requested_by: Uuid,
        data: &CreateTransfer,
    ) -> AppResult<EquipmentTransfer> {
        let row = sqlx::query_as::<_, EquipmentTransfer>(
            r#"
            INSERT INTO equipment_transfers
                (equipment_id, equipment_name, is_rental, from_site_id, to_site_id,
                 requested_by, quantity, status, comment, vehicle_number, remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(equipment.id)
        .bind(&equipment.name)
        .bind(equipment.is_rental)
        .bind(from_site_id)
        .bind(data.to_site_id)
        .bind(requested_by)
        .bind(data.quantity)
        .bind(data.comment.as_deref().map(str::trim))
        .bind(data.vehicle_number.as_deref().map(str::trim))
        .bind(data.remarks.as_deref().map(str::trim))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Transaction log: pending transfers first, then oldest first
    pub async fn list_all(&self, status: Option<TransferStatus>) -> AppResult<Vec<TransferDetails>> {
        let query = format!(
            "{} WHERE ($1::text IS NULL OR t.status = $1) \
             ORDER BY (t.status = 'pending') DESC, t.requested_at ASC, t.id ASC",
            TRANSFER_DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, TransferDetails>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Transfers touching one site. Without a direction both incoming and
    /// outgoing transfers are returned.
    pub async fn list_for_site(&self, site_id: i32, query: &TransferQuery) -> AppResult<Vec<TransferDetails>> {
        let side = match query.direction {
            Some(TransferDirection::Incoming) => "t.to_site_id = $1",
            Some(TransferDirection::Outgoing) => "t.from_site_id = $1",
            None => "(t.to_site_id = $1 OR t.from_site_id = $1)",
        };
        let sql = format!(
            "{} WHERE {} AND ($2::text IS NULL OR t.status = $2) \
             ORDER BY t.requested_at DESC, t.id DESC",
            TRANSFER_DETAILS_SELECT, side
        );
        let rows = sqlx::query_as::<_, TransferDetails>(&sql)
            .bind(site_id)
            .bind(query.status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get transfer by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<EquipmentTransfer> {
        sqlx::query_as::<_, EquipmentTransfer>("SELECT * FROM equipment_transfers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transfer {} not found", id)))
    }

    /// Get transfer with site and requester names
    pub async fn get_details(&self, id: i32) -> AppResult<TransferDetails> {
        let query = format!("{} WHERE t.id = $1", TRANSFER_DETAILS_SELECT);
        sqlx::query_as::<_, TransferDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transfer {} not found", id)))
    }

    pub async fn set_image_url(&self, id: i32, image_url: &str) -> AppResult<EquipmentTransfer> {
        sqlx::query_as::<_, EquipmentTransfer>(
            "UPDATE equipment_transfers SET image_url = $1 WHERE id = $2 RETURNING *",
        )
        .bind(image_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transfer {} not found", id)))
    }

    /// Count pending transfers (for stats)
    pub async fn count_pending(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM equipment_transfers WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Approve a pending transfer and move the stock. The source row is
    /// decremented (or deleted when emptied) and the destination line is
    /// grown or created, all in one transaction.
    ///
    /// Both equipment rows are locked in one statement in id order, so
    /// approvals moving the same line in opposite directions queue up
    /// instead of deadlocking.
    pub async fn approve(&self, id: i32, approver: Uuid, remarks: Option<&str>) -> AppResult<EquipmentTransfer> {
        let mut tx = self.pool.begin().await?;
        let transfer = Self::lock_pending(&mut tx, id).await?;

        let equipment_id = transfer.equipment_id.ok_or_else(|| {
            AppError::BusinessRule("Equipment of this transfer no longer exists".to_string())
        })?;

        let destination_id: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT d.id FROM equipment d
            JOIN equipment s ON s.id = $1
            WHERE d.site_id = $2 AND d.name = s.name AND d.is_rental = s.is_rental AND d.id <> s.id
            ORDER BY d.id
            LIMIT 1
            "#,
        )
        .bind(equipment_id)
        .bind(transfer.to_site_id)
        .fetch_optional(&mut *tx)
        .await?;

        let locked = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(lock_order(equipment_id, destination_id))
        .fetch_all(&mut *tx)
        .await?;

        let source = locked
            .iter()
            .find(|row| row.id == equipment_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", equipment_id)))?;

        if source.site_id != Some(transfer.from_site_id) {
            return Err(AppError::BusinessRule(
                "Equipment is no longer at the source site".to_string(),
            ));
        }

        // The destination row may have changed between lookup and lock
        let destination: Option<(i32, i32)> = destination_id
            .and_then(|destination_id| locked.iter().find(|row| row.id == destination_id))
            .filter(|row| {
                row.site_id == Some(transfer.to_site_id)
                    && row.name == source.name
                    && row.is_rental == source.is_rental
            })
            .map(|row| (row.id, row.quantity));

        let plan = plan_transfer(
            source.quantity,
            destination.map(|(_, quantity)| quantity),
            transfer.quantity,
        )?;

        match plan.source {
            StockRemoval::Delete => {
                sqlx::query("DELETE FROM equipment WHERE id = $1")
                    .bind(source.id)
                    .execute(&mut *tx)
                    .await?;
            }
            StockRemoval::Keep(quantity) => {
                sqlx::query("UPDATE equipment SET quantity = $1, updated_at = NOW() WHERE id = $2")
                    .bind(quantity)
                    .bind(source.id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        match destination {
            Some((destination_id, _)) => {
                sqlx::query("UPDATE equipment SET quantity = $1, updated_at = NOW() WHERE id = $2")
                    .bind(plan.destination_quantity)
                    .bind(destination_id)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO equipment (name, site_id, quantity, is_rental, status, date_bought)
                    VALUES ($1, $2, $3, $4, 'available', $5)
                    "#,
                )
                .bind(&source.name)
                .bind(transfer.to_site_id)
                .bind(plan.destination_quantity)
                .bind(source.is_rental)
                .bind(source.date_bought)
                .execute(&mut *tx)
                .await?;
            }
        }

        let row = Self::set_status(&mut tx, id, TransferStatus::Approved, approver, remarks).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Close a pending transfer without moving stock (reject or cancel)
    pub async fn close(
        &self,
        id: i32,
        status: TransferStatus,
        actor: Uuid,
        remarks: Option<&str>,
    ) -> AppResult<EquipmentTransfer> {
        let mut tx = self.pool.begin().await?;
        Self::lock_pending(&mut tx, id).await?;
        let row = Self::set_status(&mut tx, id, status, actor, remarks).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn lock_pending(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<EquipmentTransfer> {
        let transfer = sqlx::query_as::<_, EquipmentTransfer>(
            "SELECT * FROM equipment_transfers WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transfer {} not found", id)))?;

        if transfer.status.is_final() {
            return Err(AppError::BusinessRule(format!(
                "Transfer {} is already {}",
                id, transfer.status
            )));
        }
        Ok(transfer)
    }

    async fn set_status(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: i32,
        status: TransferStatus,
        actor: Uuid,
        remarks: Option<&str>,
    ) -> AppResult<EquipmentTransfer> {
        let row = sqlx::query_as::<_, EquipmentTransfer>(
            r#"
            UPDATE equipment_transfers
            SET status = $1,
                accepted = ($1 = 'approved'),
                approved_by = CASE WHEN $1 = 'approved' THEN $2::uuid END,
                decided_by = $2,
                remarks = COALESCE($3, remarks),
                decided_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(actor)
        .bind(remarks.map(str::trim))
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }
}
