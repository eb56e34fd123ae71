use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::crud::rules;
use crate::crud::{assign, push_date, push_text, ChildEntity, Changes, Column, SqlValue, UniqueKey};
use crate::errors::AppError;
use crate::models::section::SectionName;

pub struct Education;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EducationFields {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationChanges {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

impl ChildEntity for Education {
    const TABLE: &'static str = "education";
    const LABEL: &'static str = "education";
    const PATH: &'static str = "educations";
    const SECTION: Option<SectionName> = Some(SectionName::Education);
    const DUPLICATE_MESSAGE: &'static str =
        "education entry with same institution and degree already exists";

    type Fields = EducationFields;
    type Changes = EducationChanges;

    fn columns(f: &EducationFields) -> Vec<Column> {
        vec![
            ("institution", SqlValue::Text(f.institution.clone())),
            ("degree", SqlValue::Text(f.degree.clone())),
            ("field_of_study", SqlValue::Text(f.field_of_study.clone())),
            ("start_date", SqlValue::Date(f.start_date)),
            ("end_date", SqlValue::Date(f.end_date)),
            ("grade", SqlValue::Text(f.grade.clone())),
            ("description", SqlValue::Text(f.description.clone())),
        ]
    }

    fn validate(f: &EducationFields) -> Result<(), AppError> {
        rules::max_len("institution", f.institution.as_deref(), 200)?;
        rules::max_len("degree", f.degree.as_deref(), 100)?;
        rules::max_len("fieldOfStudy", f.field_of_study.as_deref(), 100)?;
        rules::max_len("grade", f.grade.as_deref(), 50)?;
        rules::max_len("description", f.description.as_deref(), 1000)?;
        rules::check_date_order(
            f.start_date,
            f.end_date,
            "start date cannot be after end date",
        )
    }

    fn unique_key(f: &EducationFields) -> Option<UniqueKey> {
        UniqueKey::from_parts([f.institution.as_ref(), f.degree.as_ref()])
    }
}

impl Changes<EducationFields> for EducationChanges {
    fn is_empty(&self) -> bool {
        self.institution.is_none()
            && self.degree.is_none()
            && self.field_of_study.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.grade.is_none()
            && self.description.is_none()
    }

    fn apply(&self, f: &mut EducationFields) {
        assign(&mut f.institution, &self.institution);
        assign(&mut f.degree, &self.degree);
        assign(&mut f.field_of_study, &self.field_of_study);
        assign(&mut f.start_date, &self.start_date);
        assign(&mut f.end_date, &self.end_date);
        assign(&mut f.grade, &self.grade);
        assign(&mut f.description, &self.description);
    }

    fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::new();
        push_text(&mut columns, "institution", &self.institution);
        push_text(&mut columns, "degree", &self.degree);
        push_text(&mut columns, "field_of_study", &self.field_of_study);
        push_date(&mut columns, "start_date", &self.start_date);
        push_date(&mut columns, "end_date", &self.end_date);
        push_text(&mut columns, "grade", &self.grade);
        push_text(&mut columns, "description", &self.description);
        columns
    }
}
