use std::sync::Arc;

use uuid::Uuid;

use super::requests::{CreateProjectReq, SearchProjectsReq, UpdateProjectReq, Verify};
use crate::database::models::Project;
use crate::database::{FetchParams, RepositoryError};
use crate::repositories::{ProjectFetchParams, ProjectRepository};

pub const PROJECT_UPDATE_FIELDS: &[&str] = &["name", "description", "timezone", "default_language"];

const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_SETTINGS: &str = "{}";

#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRepository>) -> Self {
        Self { projects }
    }

    pub async fn create(&self, req: CreateProjectReq) -> Result<Project, RepositoryError> {
        let mut project = Project {
            org_id: req.org_id,
            name: req.name,
            code: req.code,
            description: req.description,
            timezone: or_default(req.timezone, DEFAULT_TIMEZONE),
            default_language: or_default(req.default_language, DEFAULT_LANGUAGE),
            settings: DEFAULT_SETTINGS.to_string(),
            ..Project::default()
        };
        project.verify()?;
        if project.code.is_empty() {
            project.code = Uuid::new_v4().to_string();
        }

        let project = self.projects.create(project).await?;
        self.projects.get_by_id(project.id).await
    }

    pub async fn get(&self, id: i64) -> Result<Project, RepositoryError> {
        self.projects.get_by_id(id).await
    }

    pub async fn fetch(&self, req: SearchProjectsReq) -> Result<(Vec<Project>, i64), RepositoryError> {
        let params = ProjectFetchParams {
            page: FetchParams::new(req.page, req.limit),
            org_id: req.org_id,
        };
        self.projects.fetch(&params).await
    }

    pub async fn update(&self, req: UpdateProjectReq) -> Result<(), RepositoryError> {
        let mut project = self.projects.get_by_id(req.project_id).await?;
        project.name = req.name;
        project.description = req.description;
        project.timezone = or_default(req.timezone, DEFAULT_TIMEZONE);
        project.default_language = or_default(req.default_language, DEFAULT_LANGUAGE);
        project.verify()?;

        self.projects.update(&project, PROJECT_UPDATE_FIELDS).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.projects.get_by_id(id).await?;
        self.projects.delete_by_id(id).await
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_locale_fields_fall_back() {
        assert_eq!(or_default("  ".into(), DEFAULT_TIMEZONE), "UTC");
        assert_eq!(or_default("Asia/Ho_Chi_Minh".into(), DEFAULT_TIMEZONE), "Asia/Ho_Chi_Minh");
    }
}
