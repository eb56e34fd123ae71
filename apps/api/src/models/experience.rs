use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::crud::rules;
use crate::crud::{assign, push_date, push_text, ChildEntity, Changes, Column, SqlValue, UniqueKey};
use crate::errors::AppError;
use crate::models::section::SectionName;

pub struct Experience;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceFields {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceChanges {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl ChildEntity for Experience {
    const TABLE: &'static str = "experience";
    const LABEL: &'static str = "experience";
    const PATH: &'static str = "experiences";
    const SECTION: Option<SectionName> = Some(SectionName::Experience);
    const DUPLICATE_MESSAGE: &'static str =
        "experience entry with same company and position already exists";

    type Fields = ExperienceFields;
    type Changes = ExperienceChanges;

    fn columns(f: &ExperienceFields) -> Vec<Column> {
        vec![
            ("company", SqlValue::Text(f.company.clone())),
            ("position", SqlValue::Text(f.position.clone())),
            ("start_date", SqlValue::Date(f.start_date)),
            ("end_date", SqlValue::Date(f.end_date)),
            ("location", SqlValue::Text(f.location.clone())),
            ("description", SqlValue::Text(f.description.clone())),
        ]
    }

    fn validate(f: &ExperienceFields) -> Result<(), AppError> {
        rules::max_len("company", f.company.as_deref(), 200)?;
        rules::max_len("position", f.position.as_deref(), 200)?;
        rules::max_len("location", f.location.as_deref(), 200)?;
        rules::max_len("description", f.description.as_deref(), 2000)?;
        rules::check_date_order(
            f.start_date,
            f.end_date,
            "start date cannot be after end date",
        )
    }

    fn unique_key(f: &ExperienceFields) -> Option<UniqueKey> {
        UniqueKey::from_parts([f.company.as_ref(), f.position.as_ref()])
    }
}

impl Changes<ExperienceFields> for ExperienceChanges {
    fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.position.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.location.is_none()
            && self.description.is_none()
    }

    fn apply(&self, f: &mut ExperienceFields) {
        assign(&mut f.company, &self.company);
        assign(&mut f.position, &self.position);
        assign(&mut f.start_date, &self.start_date);
        assign(&mut f.end_date, &self.end_date);
        assign(&mut f.location, &self.location);
        assign(&mut f.description, &self.description);
    }

    fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::new();
        push_text(&mut columns, "company", &self.company);
        push_text(&mut columns, "position", &self.position);
        push_date(&mut columns, "start_date", &self.start_date);
        push_date(&mut columns, "end_date", &self.end_date);
        push_text(&mut columns, "location", &self.location);
        push_text(&mut columns, "description", &self.description);
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_end_date_supplied_uses_stored_start() {
        let mut stored = ExperienceFields {
            start_date: NaiveDate::from_ymd_opt(2021, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2022, 3, 1),
            ..Default::default()
        };
        let changes = ExperienceChanges {
            end_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            ..Default::default()
        };
        changes.apply(&mut stored);
        assert!(Experience::validate(&stored).is_err());
    }

    #[test]
    fn test_changes_columns_only_supplied() {
        let changes = ExperienceChanges {
            location: Some("Berlin".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
        assert_eq!(
            changes.columns(),
            vec![("location", SqlValue::Text(Some("Berlin".to_string())))]
        );
        assert!(ExperienceChanges::default().is_empty());
    }
}
