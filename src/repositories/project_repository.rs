use async_trait::async_trait;

use crate::database::models::Project;
use crate::database::statement::Predicate;
use crate::database::{DatabaseManager, FetchParams, Repository, RepositoryError};

#[derive(Debug, Clone, Default)]
pub struct ProjectFetchParams {
    pub page: FetchParams,
    /// Restrict to one org when positive.
    pub org_id: i64,
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: Project) -> Result<Project, RepositoryError>;
    async fn get_by_id(&self, id: i64) -> Result<Project, RepositoryError>;
    async fn fetch(&self, params: &ProjectFetchParams) -> Result<(Vec<Project>, i64), RepositoryError>;
    async fn update(&self, project: &Project, fields: &[&str]) -> Result<u64, RepositoryError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct PgProjectRepository {
    repo: Repository<Project>,
}

impl PgProjectRepository {
    pub fn new(db: &DatabaseManager) -> Self {
        Self { repo: Repository::new(db) }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, project: Project) -> Result<Project, RepositoryError> {
        self.repo.create(project).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Project, RepositoryError> {
        self.repo.get_by_id(id).await
    }

    async fn fetch(&self, params: &ProjectFetchParams) -> Result<(Vec<Project>, i64), RepositoryError> {
        let mut select = self.repo.counted_select(None);
        if params.org_id > 0 {
            select = select.and_where(Predicate::eq("org_id", params.org_id));
        }
        self.repo.fetch(select, &params.page).await
    }

    async fn update(&self, project: &Project, fields: &[&str]) -> Result<u64, RepositoryError> {
        self.repo.update(project, fields).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        self.repo.delete_by_id(id).await?;
        Ok(())
    }
}
