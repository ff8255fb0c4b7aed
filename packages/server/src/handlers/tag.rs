use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{question, question_tag, tag};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::tag::*;
use crate::state::AppState;

/// Find a tag by ID or return 404.
async fn find_tag<C: ConnectionTrait>(db: &C, id: i32) -> Result<tag::Model, AppError> {
    tag::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))
}

/// Create a tag.
#[instrument(skip(state, _auth_user, payload), fields(slug = %payload.slug))]
pub async fn create_tag(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_tag(&payload)?;

    let new_tag = tag::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        slug: Set(payload.slug.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_tag
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("A tag with this slug already exists".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(model))))
}

/// List all tags with their question counts.
#[instrument(skip(state, _auth_user))]
pub async fn list_tags(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TagWithCountResponse>>, AppError> {
    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await?;

    let mut counts: HashMap<i32, u64> = HashMap::new();
    for assignment in question_tag::Entity::find().all(&state.db).await? {
        *counts.entry(assignment.tag_id).or_default() += 1;
    }

    let data = tags
        .into_iter()
        .map(|t| TagWithCountResponse {
            question_count: counts.get(&t.id).copied().unwrap_or(0),
            id: t.id,
            name: t.name,
            slug: t.slug,
        })
        .collect();

    Ok(Json(data))
}

/// Get a tag with its questions.
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_tag(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TagDetailResponse>, AppError> {
    let model = find_tag(&state.db, id).await?;

    let questions = question_tag::Entity::find()
        .filter(question_tag::Column::TagId.eq(id))
        .find_also_related(question::Entity)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(_, q)| q)
        .map(|q| TagQuestionRef {
            id: q.id,
            title: q.title,
            difficulty: q.difficulty,
        })
        .collect();

    Ok(Json(TagDetailResponse {
        id: model.id,
        name: model.name,
        slug: model.slug,
        questions,
    }))
}

/// Update a tag.
#[instrument(skip(state, _auth_user, payload), fields(id))]
pub async fn update_tag(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTagRequest>,
) -> Result<Json<TagResponse>, AppError> {
    validate_update_tag(&payload)?;

    let existing = find_tag(&state.db, id).await?;
    let mut active: tag::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.trim().to_string());
    }

    let model = active
        .update(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("A tag with this slug already exists".into())
            }
            _ => AppError::from(e),
        })?;

    Ok(Json(TagResponse::from(model)))
}

/// Delete a tag and its question assignments.
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn delete_tag(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    find_tag(&txn, id).await?;

    question_tag::Entity::delete_many()
        .filter(question_tag::Column::TagId.eq(id))
        .exec(&txn)
        .await?;
    tag::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
