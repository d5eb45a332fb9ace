//! Business logic services

pub mod auth;
pub mod dashboard;
pub mod email;
pub mod equipment;
pub mod requests;
pub mod sites;
pub mod storage;
pub mod transfers;
pub mod users;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub sites: sites::SitesService,
    pub equipment: equipment::EquipmentService,
    pub requests: requests::RequestsService,
    pub transfers: transfers::TransfersService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let email = email::EmailService::new(config.email.clone())?;
        let storage = storage::StorageService::new(config.storage.clone())?;

        Ok(Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone())?,
            users: users::UsersService::new(repository.clone()),
            sites: sites::SitesService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone(), email),
            requests: requests::RequestsService::new(repository.clone()),
            transfers: transfers::TransfersService::new(repository.clone(), storage),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            repository,
        })
    }
}
