use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::mapper::{Field, Mapped};
use crate::database::repository::Entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub org_id: i64,
    pub name: String,
    pub code: String,
    pub description: String,
    pub timezone: String,
    pub settings: String,
    pub default_language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// NULL while the project is active.
    pub archived_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

impl Mapped for Project {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::column("id", self.id),
            Field::column("org_id", self.org_id),
            Field::column("name", &self.name),
            Field::column("code", &self.code),
            Field::column("description", &self.description),
            Field::column("timezone", &self.timezone),
            Field::column("settings", &self.settings),
            Field::column("default_language", &self.default_language),
            Field::column("created_at", self.created_at),
            Field::column("updated_at", self.updated_at),
            Field::column("archived_at", self.archived_at),
        ]
    }
}

impl Entity for Project {
    const TABLE: &'static str = "projects";
    const IMMUTABLE: &'static [&'static str] = &["code"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
