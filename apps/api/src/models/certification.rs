use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::crud::rules;
use crate::crud::{assign, push_date, push_text, ChildEntity, Changes, Column, SqlValue, UniqueKey};
use crate::errors::AppError;
use crate::models::section::SectionName;

pub struct Certification;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CertificationFields {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationChanges {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

impl ChildEntity for Certification {
    const TABLE: &'static str = "certifications";
    const LABEL: &'static str = "certification";
    const PATH: &'static str = "certifications";
    const SECTION: Option<SectionName> = Some(SectionName::Certifications);
    const DUPLICATE_MESSAGE: &'static str =
        "certification with same name and organization already exists";

    type Fields = CertificationFields;
    type Changes = CertificationChanges;

    fn columns(f: &CertificationFields) -> Vec<Column> {
        vec![
            ("name", SqlValue::Text(f.name.clone())),
            ("organization", SqlValue::Text(f.organization.clone())),
            ("issue_date", SqlValue::Date(f.issue_date)),
            ("expiry_date", SqlValue::Date(f.expiry_date)),
            ("credential_id", SqlValue::Text(f.credential_id.clone())),
            ("credential_url", SqlValue::Text(f.credential_url.clone())),
        ]
    }

    fn validate(f: &CertificationFields) -> Result<(), AppError> {
        rules::max_len("name", f.name.as_deref(), 200)?;
        rules::max_len("organization", f.organization.as_deref(), 200)?;
        rules::max_len("credentialId", f.credential_id.as_deref(), 100)?;
        rules::check_date_order(
            f.issue_date,
            f.expiry_date,
            "issue date cannot be after expiry date",
        )?;
        rules::check_url(f.credential_url.as_deref(), "invalid credential URL")
    }

    fn unique_key(f: &CertificationFields) -> Option<UniqueKey> {
        UniqueKey::from_parts([f.name.as_ref(), f.organization.as_ref()])
    }
}

impl Changes<CertificationFields> for CertificationChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.organization.is_none()
            && self.issue_date.is_none()
            && self.expiry_date.is_none()
            && self.credential_id.is_none()
            && self.credential_url.is_none()
    }

    fn apply(&self, f: &mut CertificationFields) {
        assign(&mut f.name, &self.name);
        assign(&mut f.organization, &self.organization);
        assign(&mut f.issue_date, &self.issue_date);
        assign(&mut f.expiry_date, &self.expiry_date);
        assign(&mut f.credential_id, &self.credential_id);
        assign(&mut f.credential_url, &self.credential_url);
    }

    fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::new();
        push_text(&mut columns, "name", &self.name);
        push_text(&mut columns, "organization", &self.organization);
        push_date(&mut columns, "issue_date", &self.issue_date);
        push_date(&mut columns, "expiry_date", &self.expiry_date);
        push_text(&mut columns, "credential_id", &self.credential_id);
        push_text(&mut columns, "credential_url", &self.credential_url);
        columns
    }
}
