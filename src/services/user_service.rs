use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::org_service::OrgService;
use super::requests::{CreateOrgReq, CreateUserReq, SearchUsersReq, UpdateUserReq, Verify};
use crate::database::models::{User, UserOrgRole, UserStatus};
use crate::database::{FetchParams, RepositoryError};
use crate::repositories::{UserFetchParams, UserOrgFetchParams, UserOrgRepository, UserRepository};

pub const USER_UPDATE_FIELDS: &[&str] = &["first_name", "last_name", "phone", "status"];

/// Name of the org every registered user starts with.
pub const DEFAULT_ORG_NAME: &str = "My Organization";

/// A user together with their role in every org they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct UserWithRoles {
    pub user: User,
    /// org_id -> role
    pub org_roles: HashMap<i64, UserOrgRole>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    memberships: Arc<dyn UserOrgRepository>,
    orgs: OrgService,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, memberships: Arc<dyn UserOrgRepository>, orgs: OrgService) -> Self {
        Self { users, memberships, orgs }
    }

    pub async fn create(&self, req: CreateUserReq) -> Result<User, RepositoryError> {
        let mut user = User {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            code: req.code,
            status: UserStatus::Active,
            ..User::default()
        };
        user.verify()?;
        if user.code.is_empty() {
            user.code = Uuid::new_v4().to_string();
        }

        let user = self.users.create(user).await?;
        self.users.get_by_id(user.id).await
    }

    /// Create the user and a default org they own.
    pub async fn register(&self, req: CreateUserReq) -> Result<User, RepositoryError> {
        let user = self.create(req).await?;
        let org = self
            .orgs
            .create(CreateOrgReq {
                name: DEFAULT_ORG_NAME.to_string(),
                user_id: user.id,
                ..CreateOrgReq::default()
            })
            .await?;
        info!(user_id = user.id, org_id = org.id, "user registered");
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<User, RepositoryError> {
        self.users.get_by_id(id).await
    }

    pub async fn get_by_code(&self, code: &str) -> Result<User, RepositoryError> {
        self.users.get_by_code(code).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        self.users.get_by_email(email).await
    }

    /// Resolve a user by code, falling back to email, and load every membership.
    pub async fn get_with_roles(&self, code: &str, email: &str) -> Result<UserWithRoles, RepositoryError> {
        let user = if !code.is_empty() {
            self.users.get_by_code(code).await?
        } else if !email.is_empty() {
            self.users.get_by_email(email).await?
        } else {
            return Err(RepositoryError::validation("user code or email is required"));
        };

        let params = UserOrgFetchParams {
            page: FetchParams::unbounded(),
            user_ids: vec![user.id],
            ..Default::default()
        };
        let (memberships, _) = self.memberships.fetch(&params).await?;
        let org_roles = memberships.into_iter().map(|m| (m.org_id, m.role)).collect();

        Ok(UserWithRoles { user, org_roles })
    }

    pub async fn fetch(&self, req: SearchUsersReq) -> Result<(Vec<User>, i64), RepositoryError> {
        let params = UserFetchParams {
            page: FetchParams::new(req.page, req.limit),
            statuses: req.statuses,
        };
        self.users.fetch(&params).await
    }

    pub async fn update(&self, req: UpdateUserReq) -> Result<(), RepositoryError> {
        let mut user = self.users.get_by_id(req.user_id).await?;
        user.first_name = req.first_name;
        user.last_name = req.last_name;
        user.phone = req.phone;
        user.status = req.status;
        user.verify()?;

        self.users.update(&user, USER_UPDATE_FIELDS).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.users.get_by_id(id).await?;
        self.users.delete_by_id(id).await
    }
}
