//! Construction sites repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::Role,
        site::{ConstructionSite, CreateSite, SiteDetails},
    },
};

const SITE_DETAILS_SELECT: &str = r#"
    SELECT s.id, s.site_name, s.contractor, s.supervisor_id,
           u.username AS supervisor_username, u.email AS supervisor_email,
           s.created_at
    FROM construction_sites s
    LEFT JOIN users u ON u.id = s.supervisor_id
"#;

#[derive(Clone)]
pub struct SitesRepository {
    pool: Pool<Postgres>,
}

impl SitesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all sites with their supervisors
    pub async fn list(&self) -> AppResult<Vec<SiteDetails>> {
        let query = format!("{} ORDER BY s.site_name", SITE_DETAILS_SELECT);
        let sites = sqlx::query_as::<_, SiteDetails>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(sites)
    }

    /// Get site by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ConstructionSite> {
        sqlx::query_as::<_, ConstructionSite>("SELECT * FROM construction_sites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Site {} not found", id)))
    }

    /// Get site with supervisor details
    pub async fn get_details(&self, id: i32) -> AppResult<SiteDetails> {
        let query = format!("{} WHERE s.id = $1", SITE_DETAILS_SELECT);
        sqlx::query_as::<_, SiteDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Site {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM construction_sites WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a site, optionally assigning its supervisor in the same
    /// transaction
    pub async fn create(&self, data: &CreateSite) -> AppResult<SiteDetails> {
        let mut tx = self.pool.begin().await?;

        let site_id: i32 = sqlx::query_scalar(
            "INSERT INTO construction_sites (site_name, contractor) VALUES ($1, $2) RETURNING id",
        )
        .bind(data.site_name.trim())
        .bind(data.contractor.as_deref().map(str::trim))
        .fetch_one(&mut *tx)
        .await?;

        if let Some(supervisor_id) = data.supervisor_id {
            Self::assign_in_tx(&mut tx, site_id, supervisor_id).await?;
        }

        tx.commit().await?;
        self.get_details(site_id).await
    }

    /// Delete a site. References from equipment or transfers make the
    /// database reject the delete, which surfaces as a conflict.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM construction_sites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Site {} not found", id)));
        }
        Ok(())
    }

    /// Make `supervisor_id` the supervisor of `site_id`, keeping
    /// `users.site_id` and `construction_sites.supervisor_id` in agreement
    pub async fn assign_supervisor(&self, site_id: i32, supervisor_id: Uuid) -> AppResult<SiteDetails> {
        let mut tx = self.pool.begin().await?;
        Self::assign_in_tx(&mut tx, site_id, supervisor_id).await?;
        tx.commit().await?;
        self.get_details(site_id).await
    }

    async fn assign_in_tx(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        site_id: i32,
        supervisor_id: Uuid,
    ) -> AppResult<()> {
        let role: Option<Role> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1 FOR UPDATE")
            .bind(supervisor_id)
            .fetch_optional(&mut **tx)
            .await?;

        match role {
            None => {
                return Err(AppError::NotFound(format!("User {} not found", supervisor_id)));
            }
            Some(Role::Admin) => {
                return Err(AppError::BusinessRule(
                    "Only supervisors can be assigned to a site".to_string(),
                ));
            }
            Some(Role::Supervisor) => {}
        }

        let previous: Option<Option<Uuid>> = sqlx::query_scalar(
            "SELECT supervisor_id FROM construction_sites WHERE id = $1 FOR UPDATE",
        )
        .bind(site_id)
        .fetch_optional(&mut **tx)
        .await?;

        let previous = previous.ok_or_else(|| AppError::NotFound(format!("Site {} not found", site_id)))?;

        // The outgoing supervisor loses the site
        if let Some(previous_id) = previous.filter(|id| *id != supervisor_id) {
            sqlx::query("UPDATE users SET site_id = NULL, updated_at = NOW() WHERE id = $1 AND site_id = $2")
                .bind(previous_id)
                .bind(site_id)
                .execute(&mut **tx)
                .await?;
        }

        // A supervisor runs one site at a time
        sqlx::query("UPDATE construction_sites SET supervisor_id = NULL WHERE supervisor_id = $1 AND id <> $2")
            .bind(supervisor_id)
            .bind(site_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query("UPDATE construction_sites SET supervisor_id = $1 WHERE id = $2")
            .bind(supervisor_id)
            .bind(site_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query("UPDATE users SET site_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(site_id)
            .bind(supervisor_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Count sites (for stats)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM construction_sites")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
