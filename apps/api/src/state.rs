use std::sync::Arc;

use axum::extract::FromRef;

use crate::crud::{EntityService, ResumeChildren};
use crate::models::certification::Certification;
use crate::models::education::Education;
use crate::models::experience::Experience;
use crate::models::project::Project;
use crate::models::section::Section;
use crate::models::skill::Skill;
use crate::repository::Repositories;
use crate::resumes::ResumeService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Each handler pulls out only the service it needs through `FromRef`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub resumes: Arc<ResumeService>,
    pub sections: Arc<EntityService<Section>>,
    pub educations: Arc<EntityService<Education>>,
    pub experiences: Arc<EntityService<Experience>>,
    pub projects: Arc<EntityService<Project>>,
    pub skills: Arc<EntityService<Skill>>,
    pub certifications: Arc<EntityService<Certification>>,
}

impl AppState {
    pub fn new(repos: Repositories, max_resumes_per_user: i64) -> Self {
        let resume_repo = repos.resumes;
        let sections = Arc::new(EntityService::new(repos.sections, resume_repo.clone()));
        let educations = Arc::new(EntityService::new(repos.educations, resume_repo.clone()));
        let experiences = Arc::new(EntityService::new(repos.experiences, resume_repo.clone()));
        let projects = Arc::new(EntityService::new(repos.projects, resume_repo.clone()));
        let skills = Arc::new(EntityService::new(repos.skills, resume_repo.clone()));
        let certifications = Arc::new(EntityService::new(
            repos.certifications,
            resume_repo.clone(),
        ));

        let children: Vec<Arc<dyn ResumeChildren>> = vec![
            educations.clone() as Arc<dyn ResumeChildren>,
            experiences.clone() as Arc<dyn ResumeChildren>,
            projects.clone() as Arc<dyn ResumeChildren>,
            skills.clone() as Arc<dyn ResumeChildren>,
            certifications.clone() as Arc<dyn ResumeChildren>,
        ];
        let resumes = Arc::new(ResumeService::new(
            resume_repo,
            sections.clone(),
            children,
            max_resumes_per_user,
        ));

        AppState {
            resumes,
            sections,
            educations,
            experiences,
            projects,
            skills,
            certifications,
        }
    }
}
