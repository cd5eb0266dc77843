use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::mapper::{Field, Mapped};
use crate::database::repository::Entity;

/// Account status, shared by users and memberships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Deactivated,
    Banned,
    /// Invited but not yet joined.
    Invited,
}

text_enum!(UserStatus {
    Active => "active",
    Deactivated => "deactivated",
    Banned => "banned",
    Invited => "invited",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Correlation key for the external identity provider.
    pub code: String,
    pub email: String,
    pub phone: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mapped for User {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::column("id", self.id),
            Field::column("first_name", &self.first_name),
            Field::column("last_name", &self.last_name),
            Field::column("code", &self.code),
            Field::column("email", &self.email),
            Field::column("phone", &self.phone),
            Field::column("status", self.status),
            Field::column("created_at", self.created_at),
            Field::column("updated_at", self.updated_at),
        ]
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const IMMUTABLE: &'static [&'static str] = &["code"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
