pub mod health;

use axum::{routing::get, Router};

use crate::crud::handlers::{entity_routes, handle_skills_by_category};
use crate::models::certification::Certification;
use crate::models::education::Education;
use crate::models::experience::Experience;
use crate::models::project::Project;
use crate::models::section::Section;
use crate::models::skill::Skill;
use crate::resumes::handlers::resume_routes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .merge(resume_routes())
        .merge(entity_routes::<Section>())
        .merge(entity_routes::<Education>())
        .merge(entity_routes::<Experience>())
        .merge(entity_routes::<Project>())
        .merge(entity_routes::<Skill>())
        .merge(entity_routes::<Certification>())
        .route(
            "/api/v1/resumes/:id/skills/category",
            get(handle_skills_by_category),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::repository::memory::MemoryRepositories;

    const USER: &str = "user-1";

    fn app() -> Router {
        let mem = MemoryRepositories::new();
        build_router(AppState::new(mem.repositories(), 10))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", USER);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_resume(app: &Router, title: &str) -> String {
        let (status, body) = send(app, "POST", "/api/v1/resumes", Some(json!({ "title": title }))).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_user_header_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/resumes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_resume_lifecycle() {
        let app = app();
        let id = create_resume(&app, "Backend").await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/resumes/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], USER);
        assert_eq!(body["theme"], "default");

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/v1/resumes/{id}"),
            Some(json!({ "theme": "modern" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "modern");

        let (status, body) = send(&app, "GET", "/api/v1/resumes?page=0&limit=500", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["limit"], 20);
        assert_eq!(body["total"], 1);
        assert!(body["data"][0].get("userId").is_none());

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/resumes/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, "GET", &format!("/api/v1/resumes/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_child_routes() {
        let app = app();
        let resume_id = create_resume(&app, "Backend").await;

        let (status, section) = send(
            &app,
            "POST",
            "/api/v1/sections",
            Some(json!({ "resumeId": resume_id, "name": "skills" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(section["displayName"], "Skills");
        assert_eq!(section["isVisible"], true);
        assert_eq!(section["orderIndex"], 1);

        let (status, skill) = send(
            &app,
            "POST",
            "/api/v1/skills",
            Some(json!({ "resumeId": resume_id, "name": "Rust", "level": "expert" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(skill["level"], "Expert");
        let skill_id = skill["id"].as_str().unwrap().to_string();

        let (status, list) =
            send(&app, "GET", &format!("/api/v1/resumes/{resume_id}/skills"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().map(Vec::len), Some(1));

        let (status, groups) = send(
            &app,
            "GET",
            &format!("/api/v1/resumes/{resume_id}/skills/category"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(groups[0]["category"], "Other");

        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/skills/order",
            Some(json!({ "skills": [{ "id": skill_id, "orderIndex": 4 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, full) =
            send(&app, "GET", &format!("/api/v1/resumes/{resume_id}/full"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(full["sections"][0]["data"][0]["orderIndex"], 4);

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/skills/{skill_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_duplicate_route() {
        let app = app();
        let id = create_resume(&app, "Backend").await;
        let (status, body) =
            send(&app, "POST", &format!("/api/v1/resumes/{id}/duplicate"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["title"], "Backend (Copy)");
    }

    #[tokio::test]
    async fn test_bad_input_is_bad_request() {
        let app = app();

        let (status, body) = send(&app, "GET", "/api/v1/skills/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "invalid skill ID");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/resumes",
            Some(json!({ "title": "CV", "theme": "neon" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let resume_id = create_resume(&app, "Backend").await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/projects",
            Some(json!({ "resumeId": resume_id, "name": "cli", "link": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "invalid project URL");
    }

    #[tokio::test]
    async fn test_list_query_edge_cases() {
        let app = app();
        create_resume(&app, "Backend").await;

        let (status, body) = send(&app, "GET", "/api/v1/resumes?page=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/resumes?page=9223372036854775807&limit=20",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_foreign_resume_children_not_found() {
        let app = app();
        let resume_id = create_resume(&app, "Backend").await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/educations")
                    .header("x-user-id", "intruder")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "resumeId": resume_id, "institution": "MIT" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
