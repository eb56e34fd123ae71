use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::crud::rules::{self, DEFAULT_SKILL_CATEGORY, SKILL_LEVELS};
use crate::crud::{assign, push_text, ChildEntity, Changes, Column, SqlValue, UniqueKey};
use crate::errors::AppError;
use crate::models::record::{Record, RecordResponse};
use crate::models::section::SectionName;

pub struct Skill;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SkillFields {
    pub name: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillChanges {
    pub name: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

pub type SkillResponse = RecordResponse<SkillFields>;

/// Skills of one resume that share a category.
#[derive(Debug, Clone, Serialize)]
pub struct SkillCategoryGroup {
    pub category: String,
    pub skills: Vec<SkillResponse>,
}

impl ChildEntity for Skill {
    const TABLE: &'static str = "skills";
    const LABEL: &'static str = "skill";
    const PATH: &'static str = "skills";
    const SECTION: Option<SectionName> = Some(SectionName::Skills);
    const DUPLICATE_MESSAGE: &'static str = "skill with same name already exists";

    type Fields = SkillFields;
    type Changes = SkillChanges;

    fn columns(f: &SkillFields) -> Vec<Column> {
        vec![
            ("name", SqlValue::Text(f.name.clone())),
            ("level", SqlValue::Text(f.level.clone())),
            ("category", SqlValue::Text(f.category.clone())),
        ]
    }

    fn validate(f: &SkillFields) -> Result<(), AppError> {
        rules::max_len("name", f.name.as_deref(), 100)?;
        rules::max_len("category", f.category.as_deref(), 50)?;
        check_level(f.level.as_deref())
    }

    fn unique_key(f: &SkillFields) -> Option<UniqueKey> {
        UniqueKey::from_parts([f.name.as_ref()])
    }

    fn apply_defaults(f: &mut SkillFields) {
        canonicalize_level(&mut f.level);
        let missing = f.category.as_deref().map(str::is_empty).unwrap_or(true);
        if missing {
            f.category = Some(DEFAULT_SKILL_CATEGORY.to_string());
        }
    }
}

impl Changes<SkillFields> for SkillChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.level.is_none() && self.category.is_none()
    }

    fn apply(&self, f: &mut SkillFields) {
        assign(&mut f.name, &self.name);
        assign(&mut f.level, &self.level);
        assign(&mut f.category, &self.category);
    }

    fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::new();
        push_text(&mut columns, "name", &self.name);
        push_text(&mut columns, "level", &self.level);
        push_text(&mut columns, "category", &self.category);
        columns
    }

    fn normalize(&mut self) {
        canonicalize_level(&mut self.level);
    }
}

fn check_level(level: Option<&str>) -> Result<(), AppError> {
    match level.filter(|l| !l.is_empty()) {
        Some(l) if rules::canonical_skill_level(l).is_none() => Err(AppError::validation(format!(
            "invalid skill level. Must be one of: {}",
            SKILL_LEVELS.join(", ")
        ))),
        _ => Ok(()),
    }
}

fn canonicalize_level(level: &mut Option<String>) {
    if let Some(canonical) = level.as_deref().and_then(rules::canonical_skill_level) {
        *level = Some(canonical.to_string());
    }
}

/// Groups skills by category. Groups come out in category order and keep the
/// incoming order of their members.
pub fn group_by_category(records: Vec<Record<SkillFields>>) -> Vec<SkillCategoryGroup> {
    let mut groups: BTreeMap<String, Vec<SkillResponse>> = BTreeMap::new();
    for record in records {
        let category = record
            .fields
            .category
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_SKILL_CATEGORY.to_string());
        groups.entry(category).or_default().push(record.into());
    }
    groups
        .into_iter()
        .map(|(category, skills)| SkillCategoryGroup { category, skills })
        .collect()
}
