use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::crud::{ChildEntity, EntityService};
use crate::errors::AppError;
use crate::extract::{parse_id, AppJson, AuthUser};
use crate::models::record::{BulkOrderRequest, ItemPatch, NewItem, RecordResponse};
use crate::models::skill::{Skill, SkillCategoryGroup};
use crate::state::AppState;

type Service<E> = State<Arc<EntityService<E>>>;

/// POST /api/v1/{entity}
pub async fn handle_create<E: ChildEntity>(
    State(service): Service<E>,
    AuthUser(user_id): AuthUser,
    AppJson(item): AppJson<NewItem<E::Fields>>,
) -> Result<(StatusCode, Json<RecordResponse<E::Fields>>), AppError> {
    let record = service.create(&user_id, item).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /api/v1/{entity}/:id
pub async fn handle_get<E: ChildEntity>(
    State(service): Service<E>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<RecordResponse<E::Fields>>, AppError> {
    let id = parse_id(&id, E::LABEL)?;
    let record = service.get(&user_id, id).await?;
    Ok(Json(record.into()))
}

/// GET /api/v1/resumes/:id/{entity}
pub async fn handle_list_by_resume<E: ChildEntity>(
    State(service): Service<E>,
    AuthUser(user_id): AuthUser,
    Path(resume_id): Path<String>,
) -> Result<Json<Vec<RecordResponse<E::Fields>>>, AppError> {
    let resume_id = parse_id(&resume_id, "resume")?;
    let records = service.list_by_resume(&user_id, resume_id).await?;
    Ok(Json(records.into_iter().map(RecordResponse::from).collect()))
}

/// PUT /api/v1/{entity}/:id
pub async fn handle_update<E: ChildEntity>(
    State(service): Service<E>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(patch): AppJson<ItemPatch<E::Changes>>,
) -> Result<Json<RecordResponse<E::Fields>>, AppError> {
    let id = parse_id(&id, E::LABEL)?;
    let record = service.update(&user_id, id, patch).await?;
    Ok(Json(record.into()))
}

/// PUT /api/v1/{entity}/order
pub async fn handle_bulk_order<E: ChildEntity>(
    State(service): Service<E>,
    AuthUser(user_id): AuthUser,
    AppJson(body): AppJson<BulkOrderRequest>,
) -> Result<StatusCode, AppError> {
    service.bulk_update_order(&user_id, body.items).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/{entity}/:id
pub async fn handle_delete<E: ChildEntity>(
    State(service): Service<E>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, E::LABEL)?;
    service.delete(&user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/:id/skills/category
pub async fn handle_skills_by_category(
    State(service): Service<Skill>,
    AuthUser(user_id): AuthUser,
    Path(resume_id): Path<String>,
) -> Result<Json<Vec<SkillCategoryGroup>>, AppError> {
    let resume_id = parse_id(&resume_id, "resume")?;
    Ok(Json(service.list_by_category(&user_id, resume_id).await?))
}

/// The six routes every child entity exposes.
pub fn entity_routes<E: ChildEntity>() -> Router<AppState>
where
    Arc<EntityService<E>>: FromRef<AppState>,
{
    let base = format!("/api/v1/{}", E::PATH);
    Router::new()
        .route(&base, post(handle_create::<E>))
        .route(&format!("{base}/order"), put(handle_bulk_order::<E>))
        .route(
            &format!("{base}/:id"),
            get(handle_get::<E>)
                .put(handle_update::<E>)
                .delete(handle_delete::<E>),
        )
        .route(
            &format!("/api/v1/resumes/:id/{}", E::PATH),
            get(handle_list_by_resume::<E>),
        )
}
