//! User management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{Session, User, UserQuery},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn search(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        self.repository.users.search(query).await
    }

    /// Admins may read anyone, other users only themselves
    pub async fn get(&self, session: &Session, id: Uuid) -> AppResult<User> {
        if !session.is_admin() && session.user_id != id {
            return Err(AppError::Authorization(
                "Not allowed to view this user".to_string(),
            ));
        }
        self.repository.users.get_by_id(id).await
    }

    pub async fn update_role(&self, session: &Session, id: Uuid, role: Role) -> AppResult<User> {
        if session.user_id == id && role != Role::Admin {
            return Err(AppError::BusinessRule(
                "You cannot remove your own admin role".to_string(),
            ));
        }

        let user = self.repository.users.update_role(id, role).await?;
        tracing::info!(user_id = %id, role = %role, by = %session.user_id, "User role changed");
        Ok(user)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> AppResult<()> {
        if session.user_id == id {
            return Err(AppError::BusinessRule(
                "You cannot delete your own account".to_string(),
            ));
        }

        self.repository.users.delete(id).await?;
        tracing::info!(user_id = %id, by = %session.user_id, "User deleted");
        Ok(())
    }
}
