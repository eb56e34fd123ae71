use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::errors::AppError;
use crate::extract::{parse_id, AppJson, AppQuery, AuthUser};
use crate::models::pagination::{PageParams, Paginated};
use crate::models::resume::{
    CreateResumeRequest, ResumeResponse, ResumeSummaryResponse, ResumeWithSections,
    UpdateResumeRequest,
};
use crate::resumes::ResumeService;
use crate::state::AppState;

/// POST /api/v1/resumes
pub async fn handle_create(
    State(service): State<Arc<ResumeService>>,
    AuthUser(user_id): AuthUser,
    AppJson(req): AppJson<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    let row = service.create(&user_id, req).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/resumes?page&limit
pub async fn handle_list(
    State(service): State<Arc<ResumeService>>,
    AuthUser(user_id): AuthUser,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<Json<Paginated<ResumeSummaryResponse>>, AppError> {
    Ok(Json(service.list(&user_id, params).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(service): State<Arc<ResumeService>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ResumeResponse>, AppError> {
    let id = parse_id(&id, "resume")?;
    Ok(Json(service.get(&user_id, id).await?.into()))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update(
    State(service): State<Arc<ResumeService>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateResumeRequest>,
) -> Result<Json<ResumeResponse>, AppError> {
    let id = parse_id(&id, "resume")?;
    Ok(Json(service.update(&user_id, id, req).await?.into()))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(service): State<Arc<ResumeService>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "resume")?;
    service.delete(&user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/duplicate
pub async fn handle_duplicate(
    State(service): State<Arc<ResumeService>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    let id = parse_id(&id, "resume")?;
    let copy = service.duplicate(&user_id, id).await?;
    Ok((StatusCode::CREATED, Json(copy.into())))
}

/// GET /api/v1/resumes/:id/full
pub async fn handle_get_full(
    State(service): State<Arc<ResumeService>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ResumeWithSections>, AppError> {
    let id = parse_id(&id, "resume")?;
    Ok(Json(service.get_full(&user_id, id).await?))
}

pub fn resume_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/resumes", post(handle_create).get(handle_list))
        .route(
            "/api/v1/resumes/:id",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .route("/api/v1/resumes/:id/duplicate", post(handle_duplicate))
        .route("/api/v1/resumes/:id/full", get(handle_get_full))
}
