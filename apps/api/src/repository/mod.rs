//! Storage seams. Services talk to `Arc<dyn ...Repository>` so the Postgres
//! implementation can be swapped for the in-memory one in tests.
//!
//! Every child query is scoped by the owning user: reads join `resumes`, writes
//! filter `resume_id` through a sub-select on `resumes.user_id`. A row owned by
//! somebody else therefore looks exactly like a missing row (`None` / `false`).

pub mod postgres;

#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::crud::ChildEntity;
use crate::models::certification::Certification;
use crate::models::education::Education;
use crate::models::experience::Experience;
use crate::models::project::Project;
use crate::models::record::Record;
use crate::models::resume::{ResumeRow, Theme};
use crate::models::section::Section;
use crate::models::skill::Skill;

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn create(&self, user_id: &str, title: &str, theme: Theme) -> Result<ResumeRow>;

    async fn find(&self, user_id: &str, id: Uuid) -> Result<Option<ResumeRow>>;

    async fn count_for_user(&self, user_id: &str) -> Result<i64>;

    /// Newest first.
    async fn list(&self, user_id: &str, limit: i64, offset: i64) -> Result<Vec<ResumeRow>>;

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        title: Option<&str>,
        theme: Option<Theme>,
    ) -> Result<Option<ResumeRow>>;

    /// Children go with the resume through `ON DELETE CASCADE`.
    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool>;
}

/// Outcome of a bulk order update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    Applied,
    /// The item was gone at write time; nothing was persisted.
    Missing(Uuid),
}

#[async_trait]
pub trait ScopedRepository<E: ChildEntity>: Send + Sync {
    /// `None` when the parent resume does not exist or is not owned by `user_id`.
    async fn insert(
        &self,
        user_id: &str,
        resume_id: Uuid,
        order_index: i32,
        fields: &E::Fields,
    ) -> Result<Option<Record<E::Fields>>>;

    async fn find(&self, user_id: &str, id: Uuid) -> Result<Option<Record<E::Fields>>>;

    /// Ordered by `order_index` ascending.
    async fn list_by_resume(
        &self,
        user_id: &str,
        resume_id: Uuid,
    ) -> Result<Vec<Record<E::Fields>>>;

    /// Writes only the supplied columns and refreshes `updated_at`.
    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        order_index: Option<i32>,
        changes: &E::Changes,
    ) -> Result<Option<Record<E::Fields>>>;

    /// All updates or none.
    async fn reorder(&self, user_id: &str, items: &[(Uuid, i32)]) -> Result<ReorderOutcome>;

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool>;
}

/// One repository per aggregate, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub resumes: Arc<dyn ResumeRepository>,
    pub sections: Arc<dyn ScopedRepository<Section>>,
    pub educations: Arc<dyn ScopedRepository<Education>>,
    pub experiences: Arc<dyn ScopedRepository<Experience>>,
    pub projects: Arc<dyn ScopedRepository<Project>>,
    pub skills: Arc<dyn ScopedRepository<Skill>>,
    pub certifications: Arc<dyn ScopedRepository<Certification>>,
}
