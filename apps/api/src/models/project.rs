use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::crud::rules::{self, MAX_TECHNOLOGIES};
use crate::crud::{assign, push_text, ChildEntity, Changes, Column, SqlValue, UniqueKey};
use crate::errors::AppError;
use crate::models::section::SectionName;

pub struct Project;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFields {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub technologies: Option<Vec<String>>,
}

impl ChildEntity for Project {
    const TABLE: &'static str = "projects";
    const LABEL: &'static str = "project";
    const PATH: &'static str = "projects";
    const SECTION: Option<SectionName> = Some(SectionName::Projects);
    const DUPLICATE_MESSAGE: &'static str = "project with same name already exists";

    type Fields = ProjectFields;
    type Changes = ProjectChanges;

    fn columns(f: &ProjectFields) -> Vec<Column> {
        vec![
            ("name", SqlValue::Text(f.name.clone())),
            ("role", SqlValue::Text(f.role.clone())),
            ("description", SqlValue::Text(f.description.clone())),
            ("link", SqlValue::Text(f.link.clone())),
            ("technologies", SqlValue::TextArray(f.technologies.clone())),
        ]
    }

    fn validate(f: &ProjectFields) -> Result<(), AppError> {
        rules::max_len("name", f.name.as_deref(), 200)?;
        rules::max_len("role", f.role.as_deref(), 200)?;
        rules::max_len("description", f.description.as_deref(), 2000)?;
        rules::check_url(f.link.as_deref(), "invalid project URL")?;
        if f.technologies.len() > MAX_TECHNOLOGIES {
            return Err(AppError::validation(format!(
                "technologies must list at most {MAX_TECHNOLOGIES} entries"
            )));
        }
        Ok(())
    }

    fn unique_key(f: &ProjectFields) -> Option<UniqueKey> {
        UniqueKey::from_parts([f.name.as_ref()])
    }
}

impl Changes<ProjectFields> for ProjectChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.description.is_none()
            && self.link.is_none()
            && self.technologies.is_none()
    }

    fn apply(&self, f: &mut ProjectFields) {
        assign(&mut f.name, &self.name);
        assign(&mut f.role, &self.role);
        assign(&mut f.description, &self.description);
        assign(&mut f.link, &self.link);
        if let Some(technologies) = &self.technologies {
            f.technologies = technologies.clone();
        }
    }

    fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::new();
        push_text(&mut columns, "name", &self.name);
        push_text(&mut columns, "role", &self.role);
        push_text(&mut columns, "description", &self.description);
        push_text(&mut columns, "link", &self.link);
        if let Some(technologies) = &self.technologies {
            columns.push(("technologies", SqlValue::TextArray(technologies.clone())));
        }
        columns
    }
}
