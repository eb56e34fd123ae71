use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::record::format_timestamp;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub theme: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Modern,
    Classic,
    Professional,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Modern => "modern",
            Theme::Classic => "classic",
            Theme::Professional => "professional",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Theme::Default),
            "modern" => Ok(Theme::Modern),
            "classic" => Ok(Theme::Classic),
            "professional" => Ok(Theme::Professional),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateResumeRequest {
    pub title: String,
    #[serde(default)]
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateResumeRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

impl UpdateResumeRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.theme.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub theme: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ResumeRow> for ResumeResponse {
    fn from(row: ResumeRow) -> Self {
        ResumeResponse {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            theme: row.theme,
            created_at: format_timestamp(&row.created_at),
            updated_at: format_timestamp(&row.updated_at),
        }
    }
}

/// List entry; omits the owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub theme: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ResumeRow> for ResumeSummaryResponse {
    fn from(row: ResumeRow) -> Self {
        ResumeSummaryResponse {
            id: row.id,
            title: row.title,
            theme: row.theme,
            created_at: format_timestamp(&row.created_at),
            updated_at: format_timestamp(&row.updated_at),
        }
    }
}

/// A section of a full resume with the items of the matching entity type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionData {
    pub id: Uuid,
    pub name: String,
    pub display_name: Option<String>,
    pub is_visible: bool,
    pub order_index: i32,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeWithSections {
    #[serde(flatten)]
    pub resume: ResumeResponse,
    pub sections: Vec<SectionData>,
}
