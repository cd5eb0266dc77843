use serde::{Deserialize, Serialize};

use crate::database::models::{Org, Project, User, UserStatus};
use crate::database::RepositoryError;

/// Payload validation run before any write.
pub trait Verify {
    fn verify(&self) -> Result<(), RepositoryError>;
}

const MAX_NAME_LEN: usize = 255;

fn required(field: &str, value: &str) -> Result<(), RepositoryError> {
    if value.trim().is_empty() {
        return Err(RepositoryError::validation(format!("{} is required", field)));
    }
    max_len(field, value, MAX_NAME_LEN)
}

fn max_len(field: &str, value: &str, max: usize) -> Result<(), RepositoryError> {
    if value.chars().count() > max {
        return Err(RepositoryError::validation(format!("{} must be at most {} characters", field, max)));
    }
    Ok(())
}

fn email(value: &str) -> Result<(), RepositoryError> {
    required("email", value)?;
    match value.split_once('@') {
        Some((local, host)) if !local.is_empty() && host.contains('.') => Ok(()),
        _ => Err(RepositoryError::validation(format!("invalid email: {}", value))),
    }
}

impl Verify for Org {
    fn verify(&self) -> Result<(), RepositoryError> {
        required("name", &self.name)?;
        max_len("domain", &self.domain, MAX_NAME_LEN)?;
        max_len("logo", &self.logo, 2048)
    }
}

impl Verify for User {
    fn verify(&self) -> Result<(), RepositoryError> {
        email(&self.email)?;
        max_len("first_name", &self.first_name, MAX_NAME_LEN)?;
        max_len("last_name", &self.last_name, MAX_NAME_LEN)?;
        max_len("phone", &self.phone, 64)
    }
}

impl Verify for Project {
    fn verify(&self) -> Result<(), RepositoryError> {
        if self.org_id <= 0 {
            return Err(RepositoryError::validation("org_id is required"));
        }
        required("name", &self.name)?;
        max_len("timezone", &self.timezone, 64)?;
        max_len("default_language", &self.default_language, 16)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrgReq {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub logo: String,
    /// Creating user; becomes the owner.
    #[serde(skip)]
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrgReq {
    #[serde(skip)]
    pub org_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub logo: String,
}

pub const MAX_INVITES: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InviteUsersReq {
    pub emails: Vec<String>,
}

impl Verify for InviteUsersReq {
    fn verify(&self) -> Result<(), RepositoryError> {
        if self.emails.is_empty() || self.emails.len() > MAX_INVITES {
            return Err(RepositoryError::validation(format!(
                "can invite 1-{} emails at once",
                MAX_INVITES
            )));
        }
        self.emails.iter().try_for_each(|e| email(e))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOrgsReq {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUserReq {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// External identity key; generated when empty.
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserReq {
    #[serde(skip)]
    pub user_id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: UserStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchUsersReq {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub statuses: Vec<UserStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProjectReq {
    pub org_id: i64,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub default_language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectReq {
    #[serde(skip)]
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub default_language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchProjectsReq {
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub org_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_requires_a_name() {
        let org = Org { name: "  ".into(), ..Org::default() };
        assert!(matches!(org.verify(), Err(RepositoryError::Validation(_))));

        let org = Org { name: "Acme".into(), ..Org::default() };
        assert!(org.verify().is_ok());
    }

    #[test]
    fn user_email_must_look_like_an_address() {
        for bad in ["", "no-at-sign", "@x.io", "a@localhost"] {
            let user = User { email: bad.into(), ..User::default() };
            assert!(user.verify().is_err(), "accepted {:?}", bad);
        }
        let user = User { email: "ada@example.com".into(), ..User::default() };
        assert!(user.verify().is_ok());
    }

    #[test]
    fn invites_are_bounded_and_checked() {
        assert!(InviteUsersReq::default().verify().is_err());

        let too_many = InviteUsersReq { emails: (0..21).map(|i| format!("u{}@example.com", i)).collect() };
        assert!(matches!(too_many.verify(), Err(RepositoryError::Validation(_))));

        let twenty = InviteUsersReq { emails: (0..20).map(|i| format!("u{}@example.com", i)).collect() };
        assert!(twenty.verify().is_ok());

        let bad = InviteUsersReq { emails: vec!["ok@example.com".into(), "nope".into()] };
        assert!(bad.verify().is_err());
    }

    #[test]
    fn project_needs_an_owning_org() {
        let project = Project { name: "Apollo".into(), ..Project::default() };
        assert!(project.verify().is_err());
        let project = Project { org_id: 1, name: "Apollo".into(), ..Project::default() };
        assert!(project.verify().is_ok());
    }

    #[test]
    fn owner_id_is_not_deserialized() {
        let req: CreateOrgReq = serde_json::from_str(r#"{"name":"Acme","user_id":42}"#).unwrap();
        assert_eq!(req.user_id, 0);
        assert_eq!(req.name, "Acme");
    }
}
