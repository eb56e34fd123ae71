use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::crud::rules::{self, SECTION_NAMES};
use crate::crud::{assign, push_text, ChildEntity, Changes, Column, SqlValue, UniqueKey};
use crate::errors::AppError;

/// Closed set of section kinds a resume can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionName {
    Education,
    Experience,
    Projects,
    Skills,
    Certifications,
    Summary,
    Contact,
}

impl SectionName {
    pub fn parse(name: &str) -> Option<Self> {
        SECTION_NAMES
            .iter()
            .find(|(_, wire, _)| *wire == name)
            .map(|(kind, _, _)| *kind)
    }

    pub fn default_display_name(self) -> &'static str {
        SECTION_NAMES
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, _, display)| *display)
            .unwrap_or_default()
    }
}

/// Schema marker for `resume_sections`.
pub struct Section;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SectionFields {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
}

fn visible_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionChanges {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub is_visible: Option<bool>,
}

impl ChildEntity for Section {
    const TABLE: &'static str = "resume_sections";
    const LABEL: &'static str = "section";
    const PATH: &'static str = "sections";
    const SECTION: Option<SectionName> = None;
    const DUPLICATE_MESSAGE: &'static str = "section with same name already exists";

    type Fields = SectionFields;
    type Changes = SectionChanges;

    fn columns(fields: &SectionFields) -> Vec<Column> {
        vec![
            ("name", SqlValue::Text(Some(fields.name.clone()))),
            ("display_name", SqlValue::Text(fields.display_name.clone())),
            ("is_visible", SqlValue::Bool(fields.is_visible)),
        ]
    }

    fn validate(fields: &SectionFields) -> Result<(), AppError> {
        if SectionName::parse(&fields.name).is_none() {
            let allowed: Vec<&str> = SECTION_NAMES.iter().map(|(_, wire, _)| *wire).collect();
            return Err(AppError::validation(format!(
                "invalid section name. Must be one of: {}",
                allowed.join(", ")
            )));
        }
        rules::max_len("displayName", fields.display_name.as_deref(), 100)
    }

    fn unique_key(fields: &SectionFields) -> Option<UniqueKey> {
        UniqueKey::from_parts([Some(&fields.name)])
    }

    fn apply_defaults(fields: &mut SectionFields) {
        let missing = fields
            .display_name
            .as_deref()
            .map(str::is_empty)
            .unwrap_or(true);
        if missing {
            fields.display_name = Some(match SectionName::parse(&fields.name) {
                Some(kind) => kind.default_display_name().to_string(),
                None => fields.name.clone(),
            });
        }
    }
}

impl Changes<SectionFields> for SectionChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.display_name.is_none() && self.is_visible.is_none()
    }

    fn apply(&self, fields: &mut SectionFields) {
        if let Some(name) = &self.name {
            fields.name = name.clone();
        }
        assign(&mut fields.display_name, &self.display_name);
        if let Some(visible) = self.is_visible {
            fields.is_visible = visible;
        }
    }

    fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::new();
        push_text(&mut columns, "name", &self.name);
        push_text(&mut columns, "display_name", &self.display_name);
        if let Some(visible) = self.is_visible {
            columns.push(("is_visible", SqlValue::Bool(visible)));
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> SectionFields {
        SectionFields {
            name: name.to_string(),
            display_name: None,
            is_visible: true,
        }
    }

    #[test]
    fn test_parse_known_names() {
        assert_eq!(SectionName::parse("projects"), Some(SectionName::Projects));
        assert_eq!(SectionName::parse("Projects"), None);
        assert_eq!(SectionName::parse("hobbies"), None);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let err = Section::validate(&fields("hobbies")).unwrap_err();
        assert!(err.to_string().contains("invalid section name"));
    }

    #[test]
    fn test_default_display_name() {
        let mut f = fields("experience");
        Section::apply_defaults(&mut f);
        assert_eq!(f.display_name.as_deref(), Some("Work Experience"));

        let mut f = fields("contact");
        f.display_name = Some(String::new());
        Section::apply_defaults(&mut f);
        assert_eq!(f.display_name.as_deref(), Some("Contact Information"));
    }

    #[test]
    fn test_explicit_display_name_kept() {
        let mut f = fields("skills");
        f.display_name = Some("Toolbox".to_string());
        Section::apply_defaults(&mut f);
        assert_eq!(f.display_name.as_deref(), Some("Toolbox"));
    }

    #[test]
    fn test_is_visible_defaults_true() {
        let f: SectionFields = serde_json::from_str(r#"{"name":"summary"}"#).unwrap();
        assert!(f.is_visible);
    }

    #[test]
    fn test_changes_apply_only_supplied() {
        let mut f = fields("skills");
        let changes = SectionChanges {
            is_visible: Some(false),
            ..Default::default()
        };
        changes.apply(&mut f);
        assert_eq!(f.name, "skills");
        assert!(!f.is_visible);
        assert_eq!(changes.columns(), vec![("is_visible", SqlValue::Bool(false))]);
    }
}
