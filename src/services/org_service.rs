use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::requests::{CreateOrgReq, InviteUsersReq, SearchOrgsReq, UpdateOrgReq, Verify};
use crate::database::models::{Org, UserOrg};
use crate::database::{FetchParams, RepositoryError, TransactionCoordinator, Tx};
use crate::repositories::{OrgFetchParams, OrgRepository, UserOrgRepository};

pub const ORG_UPDATE_FIELDS: &[&str] = &["name", "description", "logo", "domain"];

#[derive(Clone)]
pub struct OrgService {
    orgs: Arc<dyn OrgRepository>,
    memberships: Arc<dyn UserOrgRepository>,
    transactions: TransactionCoordinator,
}

impl OrgService {
    pub fn new(
        orgs: Arc<dyn OrgRepository>,
        memberships: Arc<dyn UserOrgRepository>,
        transactions: TransactionCoordinator,
    ) -> Self {
        Self { orgs, memberships, transactions }
    }

    /// Create an org and its owner membership in one transaction, then reload it.
    pub async fn create(&self, req: CreateOrgReq) -> Result<Org, RepositoryError> {
        if req.user_id < 0 {
            return Err(RepositoryError::validation("owner user id is required"));
        }

        let mut org = Org {
            name: req.name,
            description: req.description,
            domain: req.domain,
            logo: req.logo,
            ..Org::default()
        };
        org.verify()?;
        org.code = Uuid::new_v4().to_string();

        let mut tx = self.transactions.begin().await?;

        let org = match self.orgs.create_with_tx(&mut tx, org).await {
            Ok(org) => org,
            Err(e) => {
                abort(tx).await;
                return Err(e);
            }
        };

        let owner = UserOrg::owner(req.user_id, org.id);
        if let Err(e) = self.memberships.create_with_tx(&mut tx, owner).await {
            abort(tx).await;
            return Err(e);
        }

        tx.commit().await?;
        info!(org_id = org.id, owner_id = req.user_id, "org created");

        self.orgs.get_by_id(org.id).await
    }

    pub async fn get(&self, id: i64) -> Result<Org, RepositoryError> {
        self.orgs.get_by_id(id).await
    }

    pub async fn fetch(&self, req: SearchOrgsReq) -> Result<(Vec<Org>, i64), RepositoryError> {
        let params = OrgFetchParams {
            page: FetchParams::new(req.page, req.limit),
            ids: req.ids,
        };
        self.orgs.fetch(&params).await
    }

    pub async fn update(&self, req: UpdateOrgReq) -> Result<(), RepositoryError> {
        let mut org = self.orgs.get_by_id(req.org_id).await?;
        org.name = req.name;
        org.description = req.description;
        org.domain = req.domain;
        org.logo = req.logo;
        org.verify()?;

        self.orgs.update(&org, ORG_UPDATE_FIELDS).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.orgs.get_by_id(id).await?;
        self.orgs.delete_by_id(id).await
    }

    /// Check an invitation batch against an existing org. Delivery happens elsewhere.
    pub async fn invite(&self, org_id: i64, req: &InviteUsersReq) -> Result<(), RepositoryError> {
        req.verify()?;
        self.orgs.get_by_id(org_id).await?;
        info!(org_id, count = req.emails.len(), "invitations accepted");
        Ok(())
    }
}

/// Explicit rollback after a failed write. Its own failure is only logged.
async fn abort(tx: Tx) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "rollback failed");
    }
}
