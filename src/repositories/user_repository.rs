use async_trait::async_trait;

use crate::database::models::{User, UserStatus};
use crate::database::statement::Predicate;
use crate::database::{DatabaseManager, FetchParams, Repository, RepositoryError};

#[derive(Debug, Clone, Default)]
pub struct UserFetchParams {
    pub page: FetchParams,
    pub statuses: Vec<UserStatus>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
    async fn get_by_id(&self, id: i64) -> Result<User, RepositoryError>;
    async fn get_by_code(&self, code: &str) -> Result<User, RepositoryError>;
    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError>;
    async fn fetch(&self, params: &UserFetchParams) -> Result<(Vec<User>, i64), RepositoryError>;
    async fn update(&self, user: &User, fields: &[&str]) -> Result<u64, RepositoryError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    repo: Repository<User>,
}

impl PgUserRepository {
    pub fn new(db: &DatabaseManager) -> Self {
        Self { repo: Repository::new(db) }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        self.repo.create(user).await
    }

    async fn get_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        self.repo.get_by_id(id).await
    }

    async fn get_by_code(&self, code: &str) -> Result<User, RepositoryError> {
        if code.is_empty() {
            return Err(RepositoryError::validation("user code is required"));
        }
        self.repo.get_one_by(vec![Predicate::eq("code", code)]).await
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        if email.is_empty() {
            return Err(RepositoryError::validation("user email is required"));
        }
        self.repo.get_one_by(vec![Predicate::eq("email", email)]).await
    }

    async fn fetch(&self, params: &UserFetchParams) -> Result<(Vec<User>, i64), RepositoryError> {
        let mut select = self.repo.counted_select(None);
        if !params.statuses.is_empty() {
            select = select.and_where(Predicate::in_list("status", params.statuses.iter().copied()));
        }
        self.repo.fetch(select, &params.page).await
    }

    async fn update(&self, user: &User, fields: &[&str]) -> Result<u64, RepositoryError> {
        self.repo.update(user, fields).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        self.repo.delete_by_id(id).await?;
        Ok(())
    }
}
