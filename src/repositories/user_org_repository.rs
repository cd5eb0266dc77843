use async_trait::async_trait;

use crate::database::models::UserOrg;
use crate::database::statement::Predicate;
use crate::database::{DatabaseManager, FetchParams, Repository, RepositoryError, Tx};

const ALIAS: &str = "ou";
const USERS_JOIN: &str = "JOIN users AS u ON u.id = ou.user_id";

#[derive(Debug, Clone, Default)]
pub struct UserOrgFetchParams {
    pub page: FetchParams,
    pub user_ids: Vec<i64>,
    /// Restrict to one org when positive.
    pub org_id: i64,
    /// Member emails, matched through the users table.
    pub emails: Vec<String>,
}

#[async_trait]
pub trait UserOrgRepository: Send + Sync {
    async fn create(&self, membership: UserOrg) -> Result<UserOrg, RepositoryError>;
    async fn create_with_tx(&self, tx: &mut Tx, membership: UserOrg) -> Result<UserOrg, RepositoryError>;
    async fn get_by_id(&self, id: i64) -> Result<UserOrg, RepositoryError>;
    async fn fetch(&self, params: &UserOrgFetchParams) -> Result<(Vec<UserOrg>, i64), RepositoryError>;
    async fn update(&self, membership: &UserOrg, fields: &[&str]) -> Result<u64, RepositoryError>;
    async fn update_by_user_and_org(&self, membership: &UserOrg, fields: &[&str]) -> Result<u64, RepositoryError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
    async fn delete_by_user_and_org(&self, user_id: i64, org_id: i64) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct PgUserOrgRepository {
    repo: Repository<UserOrg>,
}

impl PgUserOrgRepository {
    pub fn new(db: &DatabaseManager) -> Self {
        Self { repo: Repository::new(db) }
    }
}

fn membership_key(user_id: i64, org_id: i64) -> Result<Vec<Predicate>, RepositoryError> {
    if user_id <= 0 || org_id <= 0 {
        return Err(RepositoryError::validation(format!(
            "invalid membership key: user_id={}, org_id={}",
            user_id, org_id
        )));
    }
    Ok(vec![Predicate::eq("user_id", user_id), Predicate::eq("org_id", org_id)])
}

#[async_trait]
impl UserOrgRepository for PgUserOrgRepository {
    async fn create(&self, membership: UserOrg) -> Result<UserOrg, RepositoryError> {
        self.repo.create(membership).await
    }

    async fn create_with_tx(&self, tx: &mut Tx, membership: UserOrg) -> Result<UserOrg, RepositoryError> {
        self.repo.create_with_tx(tx.conn(), membership).await
    }

    async fn get_by_id(&self, id: i64) -> Result<UserOrg, RepositoryError> {
        self.repo.get_by_id(id).await
    }

    async fn fetch(&self, params: &UserOrgFetchParams) -> Result<(Vec<UserOrg>, i64), RepositoryError> {
        let mut select = self.repo.counted_select(Some(ALIAS));
        if !params.user_ids.is_empty() {
            select = select.and_where(Predicate::in_list("user_id", params.user_ids.iter().copied()));
        }
        if params.org_id > 0 {
            select = select.and_where(Predicate::eq("org_id", params.org_id));
        }
        if !params.emails.is_empty() {
            select = select
                .join(USERS_JOIN)
                .and_where(Predicate::in_list("u.email", params.emails.iter()));
        }
        self.repo.fetch(select, &params.page).await
    }

    async fn update(&self, membership: &UserOrg, fields: &[&str]) -> Result<u64, RepositoryError> {
        self.repo.update(membership, fields).await
    }

    async fn update_by_user_and_org(&self, membership: &UserOrg, fields: &[&str]) -> Result<u64, RepositoryError> {
        let key = membership_key(membership.user_id, membership.org_id)?;
        self.repo.update_where(membership, fields, key).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        self.repo.delete_by_id(id).await?;
        Ok(())
    }

    async fn delete_by_user_and_org(&self, user_id: i64, org_id: i64) -> Result<(), RepositoryError> {
        let key = membership_key(user_id, org_id)?;
        self.repo.delete_where(key).await?;
        Ok(())
    }
}
