use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::mapper::{Field, Mapped};
use crate::database::repository::Entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Org {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: String,
    pub domain: String,
    pub logo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mapped for Org {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::column("id", self.id),
            Field::column("name", &self.name),
            Field::column("code", &self.code),
            Field::column("description", &self.description),
            Field::column("domain", &self.domain),
            Field::column("logo", &self.logo),
            Field::column("created_at", self.created_at),
            Field::column("updated_at", self.updated_at),
        ]
    }
}

impl Entity for Org {
    const TABLE: &'static str = "orgs";
    const IMMUTABLE: &'static [&'static str] = &["code"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
