use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::crud::rules::theme_transition_allowed;
use crate::crud::{EntityService, ResumeChildren};
use crate::errors::AppError;
use crate::models::pagination::{offset, PageParams, Paginated};
use crate::models::resume::{
    CreateResumeRequest, ResumeRow, ResumeSummaryResponse, ResumeWithSections, SectionData,
    Theme, UpdateResumeRequest,
};
use crate::models::section::{Section, SectionName};
use crate::repository::ResumeRepository;

pub const MAX_TITLE_LEN: usize = 100;
const COPY_SUFFIX: &str = " (Copy)";

pub struct ResumeService {
    resumes: Arc<dyn ResumeRepository>,
    sections: Arc<EntityService<Section>>,
    /// Item services, one per section kind that carries items.
    children: Vec<Arc<dyn ResumeChildren>>,
    max_resumes: i64,
}

impl ResumeService {
    pub fn new(
        resumes: Arc<dyn ResumeRepository>,
        sections: Arc<EntityService<Section>>,
        children: Vec<Arc<dyn ResumeChildren>>,
        max_resumes: i64,
    ) -> Self {
        ResumeService {
            resumes,
            sections,
            children,
            max_resumes,
        }
    }

    pub async fn create(
        &self,
        user_id: &str,
        req: CreateResumeRequest,
    ) -> Result<ResumeRow, AppError> {
        let title = validate_title(&req.title)?;
        self.ensure_below_cap(user_id).await?;

        let row = self
            .resumes
            .create(user_id, title, req.theme.unwrap_or_default())
            .await?;
        info!("Created resume {} for user {user_id}", row.id);
        Ok(row)
    }

    pub async fn get(&self, user_id: &str, id: Uuid) -> Result<ResumeRow, AppError> {
        self.resumes
            .find(user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("resume"))
    }

    pub async fn list(
        &self,
        user_id: &str,
        params: PageParams,
    ) -> Result<Paginated<ResumeSummaryResponse>, AppError> {
        let (page, limit) = params.resolve();
        let total = self.resumes.count_for_user(user_id).await?;
        let rows = self
            .resumes
            .list(user_id, limit, offset(page, limit))
            .await?;
        let data = rows.into_iter().map(ResumeSummaryResponse::from).collect();
        Ok(Paginated::new(data, page, limit, total))
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        req: UpdateResumeRequest,
    ) -> Result<ResumeRow, AppError> {
        if req.is_empty() {
            return Err(AppError::validation("no fields to update"));
        }
        let title = req.title.as_deref().map(validate_title).transpose()?;

        let existing = self.get(user_id, id).await?;
        if let Some(target) = req.theme {
            let current = stored_theme(&existing)?;
            if target != current && !theme_transition_allowed(current, target) {
                return Err(AppError::validation(format!(
                    "invalid theme transition from {current} to {target}"
                )));
            }
        }

        let row = self
            .resumes
            .update(user_id, id, title, req.theme)
            .await?
            .ok_or_else(|| AppError::not_found("resume"))?;
        info!("Updated resume {id} for user {user_id}");
        Ok(row)
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), AppError> {
        self.get(user_id, id).await?;
        if !self.resumes.delete(user_id, id).await? {
            return Err(AppError::not_found("resume"));
        }
        info!("Deleted resume {id} for user {user_id}");
        Ok(())
    }

    /// Copies the resume with every section and item. Not atomic: a failure
    /// part-way leaves a partial copy behind.
    pub async fn duplicate(&self, user_id: &str, id: Uuid) -> Result<ResumeRow, AppError> {
        let source = self.get(user_id, id).await?;
        self.ensure_below_cap(user_id).await?;

        let theme = stored_theme(&source)?;
        let copy = self
            .resumes
            .create(user_id, &copy_title(&source.title), theme)
            .await?;

        let mut copied = self.sections.copy_into(user_id, id, copy.id).await?;
        for child in &self.children {
            copied += child.copy_into(user_id, id, copy.id).await?;
        }

        info!(
            "Duplicated resume {id} into {} ({copied} rows) for user {user_id}",
            copy.id
        );
        Ok(copy)
    }

    /// The resume with its sections in order, each carrying the items of the
    /// matching entity type.
    pub async fn get_full(&self, user_id: &str, id: Uuid) -> Result<ResumeWithSections, AppError> {
        let resume = self.get(user_id, id).await?;
        let sections = self.sections.list_by_resume(user_id, id).await?;

        let mut data = Vec::with_capacity(sections.len());
        for section in sections {
            let items = match SectionName::parse(&section.fields.name) {
                Some(kind) => self.items_for(kind, user_id, id).await?,
                None => Value::Null,
            };
            data.push(SectionData {
                id: section.id,
                name: section.fields.name,
                display_name: section.fields.display_name,
                is_visible: section.fields.is_visible,
                order_index: section.order_index,
                data: items,
            });
        }

        Ok(ResumeWithSections {
            resume: resume.into(),
            sections: data,
        })
    }

    async fn items_for(
        &self,
        kind: SectionName,
        user_id: &str,
        resume_id: Uuid,
    ) -> Result<Value, AppError> {
        match self.children.iter().find(|c| c.section() == Some(kind)) {
            Some(child) => child.list_json(user_id, resume_id).await,
            None => Ok(Value::Null),
        }
    }

    async fn ensure_below_cap(&self, user_id: &str) -> Result<(), AppError> {
        let count = self.resumes.count_for_user(user_id).await?;
        if count >= self.max_resumes {
            return Err(AppError::validation(format!(
                "maximum number of resumes ({}) reached",
                self.max_resumes
            )));
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<&str, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(trimmed)
}

fn stored_theme(row: &ResumeRow) -> Result<Theme, AppError> {
    row.theme
        .parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))
}

/// `"<title> (Copy)"`, shortening the base so the result stays a valid title.
fn copy_title(title: &str) -> String {
    let room = MAX_TITLE_LEN - COPY_SUFFIX.chars().count();
    let base: String = title.chars().take(room).collect();
    format!("{}{COPY_SUFFIX}", base.trim_end())
}
