use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crud::rules;
use crate::crud::{ChildEntity, Changes};
use crate::errors::AppError;
use crate::extract::parse_id;
use crate::models::record::{ItemPatch, NewItem, OrderUpdate, Record, RecordResponse};
use crate::models::section::SectionName;
use crate::models::skill::{group_by_category, Skill, SkillCategoryGroup};
use crate::repository::{ReorderOutcome, ResumeRepository, ScopedRepository};

/// Business rules for one child entity type, on top of its scoped repository.
pub struct EntityService<E: ChildEntity> {
    repo: Arc<dyn ScopedRepository<E>>,
    resumes: Arc<dyn ResumeRepository>,
}

impl<E: ChildEntity> EntityService<E> {
    pub fn new(repo: Arc<dyn ScopedRepository<E>>, resumes: Arc<dyn ResumeRepository>) -> Self {
        EntityService { repo, resumes }
    }

    pub async fn create(
        &self,
        user_id: &str,
        item: NewItem<E::Fields>,
    ) -> Result<Record<E::Fields>, AppError> {
        let NewItem {
            resume_id,
            order_index,
            mut fields,
        } = item;

        self.require_resume(user_id, resume_id).await?;

        E::apply_defaults(&mut fields);
        rules::check_order_index(order_index)?;
        E::validate(&fields)?;

        let siblings = self.repo.list_by_resume(user_id, resume_id).await?;
        ensure_unique::<E>(&fields, &siblings, None)?;

        let order_index = match order_index {
            Some(index) if index > 0 => index,
            _ => siblings.len() as i32 + 1,
        };

        // The parent may have vanished since the ownership check.
        let record = self
            .repo
            .insert(user_id, resume_id, order_index, &fields)
            .await?
            .ok_or_else(|| AppError::not_found("resume"))?;

        info!(
            "Created {} {} on resume {resume_id} for user {user_id}",
            E::LABEL,
            record.id
        );
        Ok(record)
    }

    pub async fn get(&self, user_id: &str, id: Uuid) -> Result<Record<E::Fields>, AppError> {
        self.repo
            .find(user_id, id)
            .await?
            .ok_or_else(|| AppError::not_found(E::LABEL))
    }

    pub async fn list_by_resume(
        &self,
        user_id: &str,
        resume_id: Uuid,
    ) -> Result<Vec<Record<E::Fields>>, AppError> {
        self.require_resume(user_id, resume_id).await?;
        Ok(self.repo.list_by_resume(user_id, resume_id).await?)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        patch: ItemPatch<E::Changes>,
    ) -> Result<Record<E::Fields>, AppError> {
        let ItemPatch {
            order_index,
            mut changes,
        } = patch;

        if order_index.is_none() && changes.is_empty() {
            return Err(AppError::validation("no fields to update"));
        }
        rules::check_order_index(order_index)?;
        changes.normalize();

        let existing = self.get(user_id, id).await?;

        let mut merged = existing.fields.clone();
        changes.apply(&mut merged);
        E::validate(&merged)?;

        if !changes.is_empty() {
            let siblings = self.repo.list_by_resume(user_id, existing.resume_id).await?;
            ensure_unique::<E>(&merged, &siblings, Some(id))?;
        }

        let record = self
            .repo
            .update(user_id, id, order_index, &changes)
            .await?
            .ok_or_else(|| AppError::not_found(E::LABEL))?;

        info!("Updated {} {id} for user {user_id}", E::LABEL);
        Ok(record)
    }

    /// Applies every order change or none of them.
    pub async fn bulk_update_order(
        &self,
        user_id: &str,
        items: Vec<OrderUpdate>,
    ) -> Result<(), AppError> {
        if items.is_empty() {
            return Err(AppError::validation("no items to reorder"));
        }

        let mut updates = Vec::with_capacity(items.len());
        for item in &items {
            let id = parse_id(&item.id, E::LABEL)?;
            rules::check_order_index(Some(item.order_index))?;
            updates.push((id, item.order_index));
        }

        for (id, _) in &updates {
            self.get(user_id, *id).await?;
        }

        match self.repo.reorder(user_id, &updates).await? {
            ReorderOutcome::Applied => {
                info!(
                    "Reordered {} {} rows for user {user_id}",
                    updates.len(),
                    E::LABEL
                );
                Ok(())
            }
            ReorderOutcome::Missing(id) => {
                warn!("Reorder of {} rolled back: {id} disappeared", E::LABEL);
                Err(AppError::not_found(E::LABEL))
            }
        }
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), AppError> {
        self.get(user_id, id).await?;
        if !self.repo.delete(user_id, id).await? {
            return Err(AppError::not_found(E::LABEL));
        }
        info!("Deleted {} {id} for user {user_id}", E::LABEL);
        Ok(())
    }

    async fn require_resume(&self, user_id: &str, resume_id: Uuid) -> Result<(), AppError> {
        self.resumes
            .find(user_id, resume_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("resume"))
    }
}

/// Rejects `fields` when a sibling other than `exclude` has the same key.
fn ensure_unique<E: ChildEntity>(
    fields: &E::Fields,
    siblings: &[Record<E::Fields>],
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let Some(key) = E::unique_key(fields) else {
        return Ok(());
    };
    let clash = siblings
        .iter()
        .filter(|sibling| Some(sibling.id) != exclude)
        .any(|sibling| E::unique_key(&sibling.fields).as_ref() == Some(&key));
    if clash {
        Err(AppError::validation(E::DUPLICATE_MESSAGE))
    } else {
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

impl EntityService<Skill> {
    pub async fn list_by_category(
        &self,
        user_id: &str,
        resume_id: Uuid,
    ) -> Result<Vec<SkillCategoryGroup>, AppError> {
        let skills = self.list_by_resume(user_id, resume_id).await?;
        Ok(group_by_category(skills))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Type-erased view used by the resume service
// ────────────────────────────────────────────────────────────────────────────

/// What the resume service needs from each child service without knowing
/// its entity type.
#[async_trait]
pub trait ResumeChildren: Send + Sync {
    /// Section kind rendered from these items, if any.
    fn section(&self) -> Option<SectionName>;

    async fn list_json(&self, user_id: &str, resume_id: Uuid) -> Result<Value, AppError>;

    /// Copies every item of `from` onto `to`, keeping order indexes.
    async fn copy_into(&self, user_id: &str, from: Uuid, to: Uuid) -> Result<usize, AppError>;
}

#[async_trait]
impl<E: ChildEntity> ResumeChildren for EntityService<E> {
    fn section(&self) -> Option<SectionName> {
        E::SECTION
    }

    async fn list_json(&self, user_id: &str, resume_id: Uuid) -> Result<Value, AppError> {
        let items: Vec<RecordResponse<E::Fields>> = self
            .list_by_resume(user_id, resume_id)
            .await?
            .into_iter()
            .map(RecordResponse::from)
            .collect();
        serde_json::to_value(items).map_err(|e| AppError::Internal(e.into()))
    }

    async fn copy_into(&self, user_id: &str, from: Uuid, to: Uuid) -> Result<usize, AppError> {
        let records = self.repo.list_by_resume(user_id, from).await?;
        for record in &records {
            self.repo
                .insert(user_id, to, record.order_index, &record.fields)
                .await?
                .ok_or_else(|| AppError::not_found("resume"))?;
        }
        Ok(records.len())
    }
}
