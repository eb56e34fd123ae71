//! In-memory repositories used by service and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::crud::{ChildEntity, Changes};
use crate::models::certification::Certification;
use crate::models::education::Education;
use crate::models::experience::Experience;
use crate::models::project::Project;
use crate::models::record::Record;
use crate::models::resume::{ResumeRow, Theme};
use crate::models::section::Section;
use crate::models::skill::Skill;
use crate::repository::{
    ReorderOutcome, Repositories, ResumeRepository, ScopedRepository,
};

#[derive(Default)]
pub struct MemoryResumeRepository {
    rows: Mutex<Vec<ResumeRow>>,
}

impl MemoryResumeRepository {
    fn owns(&self, user_id: &str, resume_id: Uuid) -> bool {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.id == resume_id && r.user_id == user_id)
    }
}

#[async_trait]
impl ResumeRepository for MemoryResumeRepository {
    async fn create(&self, user_id: &str, title: &str, theme: Theme) -> Result<ResumeRow> {
        let now = Utc::now();
        let row = ResumeRow {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            theme: theme.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find(&self, user_id: &str, id: Uuid) -> Result<Option<ResumeRow>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn count_for_user(&self, user_id: &str) -> Result<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|r| r.user_id == user_id).count() as i64)
    }

    async fn list(&self, user_id: &str, limit: i64, offset: i64) -> Result<Vec<ResumeRow>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        title: Option<&str>,
        theme: Option<Theme>,
    ) -> Result<Option<ResumeRow>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(title) = title {
            row.title = title.to_string();
        }
        if let Some(theme) = theme {
            row.theme = theme.as_str().to_string();
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(rows.len() < before)
    }
}

pub struct MemoryScopedRepository<E: ChildEntity> {
    resumes: Arc<MemoryResumeRepository>,
    rows: Mutex<Vec<Record<E::Fields>>>,
    calls: AtomicUsize,
    fail_reorder_on: Mutex<Option<usize>>,
}

impl<E: ChildEntity> MemoryScopedRepository<E> {
    pub fn new(resumes: Arc<MemoryResumeRepository>) -> Self {
        MemoryScopedRepository {
            resumes,
            rows: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail_reorder_on: Mutex::new(None),
        }
    }

    /// Number of repository calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes the next reorder behave as if the item at `position` vanished
    /// between the ownership check and the write.
    pub fn fail_reorder_on(&self, position: usize) {
        *self.fail_reorder_on.lock().unwrap() = Some(position);
    }

    pub fn snapshot(&self) -> Vec<Record<E::Fields>> {
        self.rows.lock().unwrap().clone()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn owned(&self, user_id: &str, record: &Record<E::Fields>) -> bool {
        self.resumes.owns(user_id, record.resume_id)
    }
}

#[async_trait]
impl<E: ChildEntity> ScopedRepository<E> for MemoryScopedRepository<E> {
    async fn insert(
        &self,
        user_id: &str,
        resume_id: Uuid,
        order_index: i32,
        fields: &E::Fields,
    ) -> Result<Option<Record<E::Fields>>> {
        self.touch();
        if !self.resumes.owns(user_id, resume_id) {
            return Ok(None);
        }
        let now = Utc::now();
        let record = Record {
            id: Uuid::new_v4(),
            resume_id,
            order_index,
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(Some(record))
    }

    async fn find(&self, user_id: &str, id: Uuid) -> Result<Option<Record<E::Fields>>> {
        self.touch();
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.id == id && self.owned(user_id, r))
            .cloned())
    }

    async fn list_by_resume(
        &self,
        user_id: &str,
        resume_id: Uuid,
    ) -> Result<Vec<Record<E::Fields>>> {
        self.touch();
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<_> = rows
            .iter()
            .filter(|r| r.resume_id == resume_id && self.owned(user_id, r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.order_index);
        Ok(found)
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        order_index: Option<i32>,
        changes: &E::Changes,
    ) -> Result<Option<Record<E::Fields>>> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let Some(record) = rows
            .iter_mut()
            .find(|r| r.id == id && self.resumes.owns(user_id, r.resume_id))
        else {
            return Ok(None);
        };
        changes.apply(&mut record.fields);
        if let Some(order_index) = order_index {
            record.order_index = order_index;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn reorder(&self, user_id: &str, items: &[(Uuid, i32)]) -> Result<ReorderOutcome> {
        self.touch();
        let fail_on = self.fail_reorder_on.lock().unwrap().take();
        let mut rows = self.rows.lock().unwrap();
        let mut staged = rows.clone();

        for (position, &(id, order_index)) in items.iter().enumerate() {
            let target = staged
                .iter_mut()
                .find(|r| r.id == id && self.resumes.owns(user_id, r.resume_id));
            match target {
                Some(record) if fail_on != Some(position) => {
                    record.order_index = order_index;
                    record.updated_at = Utc::now();
                }
                _ => return Ok(ReorderOutcome::Missing(id)),
            }
        }

        *rows = staged;
        Ok(ReorderOutcome::Applied)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && self.resumes.owns(user_id, r.resume_id)));
        Ok(rows.len() < before)
    }
}

/// Concrete handles on every in-memory repository, so tests can inspect them.
pub struct MemoryRepositories {
    pub resumes: Arc<MemoryResumeRepository>,
    pub sections: Arc<MemoryScopedRepository<Section>>,
    pub educations: Arc<MemoryScopedRepository<Education>>,
    pub experiences: Arc<MemoryScopedRepository<Experience>>,
    pub projects: Arc<MemoryScopedRepository<Project>>,
    pub skills: Arc<MemoryScopedRepository<Skill>>,
    pub certifications: Arc<MemoryScopedRepository<Certification>>,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        let resumes = Arc::new(MemoryResumeRepository::default());
        MemoryRepositories {
            sections: Arc::new(MemoryScopedRepository::new(resumes.clone())),
            educations: Arc::new(MemoryScopedRepository::new(resumes.clone())),
            experiences: Arc::new(MemoryScopedRepository::new(resumes.clone())),
            projects: Arc::new(MemoryScopedRepository::new(resumes.clone())),
            skills: Arc::new(MemoryScopedRepository::new(resumes.clone())),
            certifications: Arc::new(MemoryScopedRepository::new(resumes.clone())),
            resumes,
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            resumes: self.resumes.clone(),
            sections: self.sections.clone(),
            educations: self.educations.clone(),
            experiences: self.experiences.clone(),
            projects: self.projects.clone(),
            skills: self.skills.clone(),
            certifications: self.certifications.clone(),
        }
    }
}
