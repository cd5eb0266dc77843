pub mod org_repository;
pub mod project_repository;
pub mod user_org_repository;
pub mod user_repository;

pub use org_repository::{OrgFetchParams, OrgRepository, PgOrgRepository};
pub use project_repository::{PgProjectRepository, ProjectFetchParams, ProjectRepository};
pub use user_org_repository::{PgUserOrgRepository, UserOrgFetchParams, UserOrgRepository};
pub use user_repository::{PgUserRepository, UserFetchParams, UserRepository};
