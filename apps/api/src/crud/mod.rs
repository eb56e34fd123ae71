//! Generic CRUD engine for the child entities of a resume.
//!
//! An entity type is declared once by implementing [`ChildEntity`]: its table,
//! its descriptive fields and the columns they map to, its validation rules and
//! its uniqueness key. The scoped repositories and [`EntityService`] are written
//! against the trait, so every section type shares one create/read/update/
//! delete/reorder pipeline.

pub mod handlers;
pub mod rules;
pub mod service;

pub use service::{EntityService, ResumeChildren};

use std::fmt::Debug;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::postgres::PgRow;
use sqlx::FromRow;

use crate::errors::AppError;
use crate::models::section::SectionName;

/// A value bound into an INSERT or UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Bool(bool),
    TextArray(Vec<String>),
}

/// Column name paired with the value written to it.
pub type Column = (&'static str, SqlValue);

/// Schema declaration for a resume child entity.
pub trait ChildEntity: Send + Sync + 'static {
    /// Backing table; every row carries `id`, `resume_id`, `order_index`,
    /// `created_at` and `updated_at` besides the entity's own columns.
    const TABLE: &'static str;
    /// Singular noun used in error messages ("education not found").
    const LABEL: &'static str;
    /// Route segment under `/api/v1`.
    const PATH: &'static str;
    /// Section kind whose items this entity holds, if any.
    const SECTION: Option<SectionName>;
    const DUPLICATE_MESSAGE: &'static str;

    type Fields: Debug
        + Clone
        + PartialEq
        + Send
        + Sync
        + Unpin
        + Serialize
        + DeserializeOwned
        + for<'r> FromRow<'r, PgRow>
        + 'static;
    type Changes: Changes<Self::Fields>;

    /// Every descriptive column with its value, in insert order.
    fn columns(fields: &Self::Fields) -> Vec<Column>;

    /// Business rules over a complete set of fields. Updates are validated on
    /// the stored record merged with the patch.
    fn validate(fields: &Self::Fields) -> Result<(), AppError>;

    /// Key that must be unique among the siblings of one resume.
    fn unique_key(fields: &Self::Fields) -> Option<UniqueKey>;

    /// Fills defaults on create.
    fn apply_defaults(_fields: &mut Self::Fields) {}
}

/// Partial update payload: every field optional, only supplied ones persist.
pub trait Changes<F>: Debug + Clone + Send + Sync + DeserializeOwned + 'static {
    fn is_empty(&self) -> bool;

    fn apply(&self, fields: &mut F);

    /// Only the supplied columns.
    fn columns(&self) -> Vec<Column>;

    fn normalize(&mut self) {}
}

/// Uniqueness key of a record. Absent components compare equal to each
/// other; a key made only of absent components does not participate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey(Vec<Option<String>>);

impl UniqueKey {
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = Option<&'a String>>) -> Option<Self> {
        let parts: Vec<Option<String>> = parts.into_iter().map(|p| p.cloned()).collect();
        if parts.iter().all(Option::is_none) {
            None
        } else {
            Some(UniqueKey(parts))
        }
    }
}

pub(crate) fn push_text(columns: &mut Vec<Column>, name: &'static str, value: &Option<String>) {
    if let Some(v) = value {
        columns.push((name, SqlValue::Text(Some(v.clone()))));
    }
}

pub(crate) fn push_date(columns: &mut Vec<Column>, name: &'static str, value: &Option<NaiveDate>) {
    if let Some(v) = value {
        columns.push((name, SqlValue::Date(Some(*v))));
    }
}

pub(crate) fn assign<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *target = Some(v.clone());
    }
}
