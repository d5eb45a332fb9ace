//! Construction sites service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        site::{CreateSite, SiteDetails},
        user::Session,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SitesService {
    repository: Repository,
}

impl SitesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<SiteDetails>> {
        self.repository.sites.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<SiteDetails> {
        self.repository.sites.get_details(id).await
    }

    pub async fn create(&self, session: &Session, data: CreateSite) -> AppResult<SiteDetails> {
        data.validate()?;
        let site = self.repository.sites.create(&data).await?;
        tracing::info!(site_id = site.id, by = %session.user_id, "Site created");
        Ok(site)
    }

    pub async fn delete(&self, session: &Session, id: i32) -> AppResult<()> {
        self.repository.sites.delete(id).await?;
        tracing::info!(site_id = id, by = %session.user_id, "Site deleted");
        Ok(())
    }

    pub async fn assign_supervisor(
        &self,
        session: &Session,
        site_id: i32,
        supervisor_id: Uuid,
    ) -> AppResult<SiteDetails> {
        let site = self
            .repository
            .sites
            .assign_supervisor(site_id, supervisor_id)
            .await?;
        tracing::info!(site_id, supervisor_id = %supervisor_id, by = %session.user_id, "Supervisor assigned");
        Ok(site)
    }
}
