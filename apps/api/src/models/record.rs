use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

/// A stored child row: the columns every child table shares plus the
/// entity's descriptive fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<F> {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub order_index: i32,
    pub fields: F,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r, F> FromRow<'r, PgRow> for Record<F>
where
    F: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Record {
            id: row.try_get("id")?,
            resume_id: row.try_get("resume_id")?,
            order_index: row.try_get("order_index")?,
            fields: F::from_row(row)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Public JSON shape of a child row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse<F> {
    pub id: Uuid,
    pub resume_id: Uuid,
    #[serde(flatten)]
    pub fields: F,
    pub order_index: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl<F> From<Record<F>> for RecordResponse<F> {
    fn from(record: Record<F>) -> Self {
        RecordResponse {
            id: record.id,
            resume_id: record.resume_id,
            fields: record.fields,
            order_index: record.order_index,
            created_at: format_timestamp(&record.created_at),
            updated_at: format_timestamp(&record.updated_at),
        }
    }
}

/// Create payload. An absent or zero `orderIndex` means "append".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem<F> {
    pub resume_id: Uuid,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(flatten)]
    pub fields: F,
}

/// Update payload: optional order index plus the entity's optional fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch<C> {
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(flatten)]
    pub changes: C,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: String,
    pub order_index: i32,
}

/// Bulk reorder payload. The per-entity keys of the v1 clients are accepted
/// as aliases of `items`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkOrderRequest {
    #[serde(
        alias = "sections",
        alias = "education",
        alias = "experience",
        alias = "projects",
        alias = "skills",
        alias = "certifications"
    )]
    pub items: Vec<OrderUpdate>,
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
