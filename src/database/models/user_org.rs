use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserStatus;
use crate::database::mapper::{Field, Mapped};
use crate::database::repository::Entity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserOrgRole {
    Owner,
    Manager,
    Editor,
    Viewer,
    #[default]
    Guest,
}

text_enum!(UserOrgRole {
    Owner => "owner",
    Manager => "manager",
    Editor => "editor",
    Viewer => "viewer",
    Guest => "guest",
});

/// Membership of a user in an org. One row per (user_id, org_id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserOrg {
    pub id: i64,
    pub user_id: i64,
    pub org_id: i64,
    pub role: UserOrgRole,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserOrg {
    pub fn owner(user_id: i64, org_id: i64) -> Self {
        Self {
            user_id,
            org_id,
            role: UserOrgRole::Owner,
            status: UserStatus::Active,
            ..Self::default()
        }
    }
}

impl Mapped for UserOrg {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::column("id", self.id),
            Field::column("user_id", self.user_id),
            Field::column("org_id", self.org_id),
            Field::column("role", self.role),
            Field::column("status", self.status),
            Field::column("created_at", self.created_at),
            Field::column("updated_at", self.updated_at),
        ]
    }
}

impl Entity for UserOrg {
    const TABLE: &'static str = "users_orgs";
    const IMMUTABLE: &'static [&'static str] = &["user_id", "org_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_membership_is_active() {
        let m = UserOrg::owner(7, 3);
        assert_eq!((m.user_id, m.org_id), (7, 3));
        assert_eq!(m.role, UserOrgRole::Owner);
        assert_eq!(m.status, UserStatus::Active);
        assert_eq!(m.id, 0);
    }

    #[test]
    fn role_parses_every_variant() {
        for role in ["owner", "manager", "editor", "viewer", "guest"] {
            let parsed: UserOrgRole = role.parse().unwrap();
            assert_eq!(parsed.as_str(), role);
        }
    }
}
