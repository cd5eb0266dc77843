pub mod org_service;
pub mod project_service;
pub mod requests;
pub mod user_service;

use std::sync::Arc;

pub use org_service::OrgService;
pub use project_service::ProjectService;
pub use user_service::{UserService, UserWithRoles};

use crate::database::{DatabaseManager, TransactionCoordinator};
use crate::repositories::{PgOrgRepository, PgProjectRepository, PgUserOrgRepository, PgUserRepository};

/// Every service wired against Postgres repositories.
#[derive(Clone)]
pub struct Services {
    pub orgs: OrgService,
    pub users: UserService,
    pub projects: ProjectService,
}

impl Services {
    pub fn new(db: &DatabaseManager) -> Self {
        let memberships = Arc::new(PgUserOrgRepository::new(db));
        let orgs = OrgService::new(
            Arc::new(PgOrgRepository::new(db)),
            memberships.clone(),
            TransactionCoordinator::new(db.primary().clone()),
        );
        Self {
            users: UserService::new(Arc::new(PgUserRepository::new(db)), memberships, orgs.clone()),
            projects: ProjectService::new(Arc::new(PgProjectRepository::new(db))),
            orgs,
        }
    }
}
