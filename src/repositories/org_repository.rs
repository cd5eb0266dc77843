use async_trait::async_trait;

use crate::database::models::Org;
use crate::database::statement::Predicate;
use crate::database::{DatabaseManager, FetchParams, Repository, RepositoryError, Tx};

#[derive(Debug, Clone, Default)]
pub struct OrgFetchParams {
    pub page: FetchParams,
    pub ids: Vec<i64>,
}

#[async_trait]
pub trait OrgRepository: Send + Sync {
    async fn create(&self, org: Org) -> Result<Org, RepositoryError>;
    async fn create_with_tx(&self, tx: &mut Tx, org: Org) -> Result<Org, RepositoryError>;
    async fn get_by_id(&self, id: i64) -> Result<Org, RepositoryError>;
    async fn fetch(&self, params: &OrgFetchParams) -> Result<(Vec<Org>, i64), RepositoryError>;
    async fn update(&self, org: &Org, fields: &[&str]) -> Result<u64, RepositoryError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct PgOrgRepository {
    repo: Repository<Org>,
}

impl PgOrgRepository {
    pub fn new(db: &DatabaseManager) -> Self {
        Self { repo: Repository::new(db) }
    }
}

#[async_trait]
impl OrgRepository for PgOrgRepository {
    async fn create(&self, org: Org) -> Result<Org, RepositoryError> {
        self.repo.create(org).await
    }

    async fn create_with_tx(&self, tx: &mut Tx, org: Org) -> Result<Org, RepositoryError> {
        self.repo.create_with_tx(tx.conn(), org).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Org, RepositoryError> {
        self.repo.get_by_id(id).await
    }

    async fn fetch(&self, params: &OrgFetchParams) -> Result<(Vec<Org>, i64), RepositoryError> {
        let mut select = self.repo.counted_select(None);
        if !params.ids.is_empty() {
            select = select.and_where(Predicate::in_list("id", params.ids.iter().copied()));
        }
        self.repo.fetch(select, &params.page).await
    }

    async fn update(&self, org: &Org, fields: &[&str]) -> Result<u64, RepositoryError> {
        self.repo.update(org, fields).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        self.repo.delete_by_id(id).await?;
        Ok(())
    }
}
