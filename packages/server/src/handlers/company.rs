use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{company, question, question_company};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::company::*;
use crate::models::shared::Pagination;
use crate::state::AppState;

/// Find a company by ID or return 404.
async fn find_company<C: ConnectionTrait>(db: &C, id: i32) -> Result<company::Model, AppError> {
    company::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))
}

fn map_slug_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A company with this slug already exists".into())
        }
        _ => AppError::from(e),
    }
}

/// Create a company.
#[instrument(skip(state, _auth_user, payload), fields(slug = %payload.slug))]
pub async fn create_company(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_company(&payload)?;

    let new_company = company::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        slug: Set(payload.slug.trim().to_string()),
        website: Set(payload.website),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_company
        .insert(&state.db)
        .await
        .map_err(map_slug_conflict)?;

    Ok((StatusCode::CREATED, Json(CompanyResponse::from(model))))
}

/// List companies, paginated, alphabetical by name.
#[instrument(skip(state, _auth_user, query))]
pub async fn list_companies(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CompanyListQuery>,
) -> Result<Json<CompanyListResponse>, AppError> {
    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let select = company::Entity::find();
    let total = select.clone().count(&state.db).await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_asc(company::Column::Name)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(CompanyResponse::from)
        .collect();

    Ok(Json(CompanyListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

async fn company_detail(
    db: &DatabaseConnection,
    model: company::Model,
) -> Result<CompanyDetailResponse, AppError> {
    let questions = question_company::Entity::find()
        .filter(question_company::Column::CompanyId.eq(model.id))
        .find_also_related(question::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, q)| q)
        .map(|q| CompanyQuestionRef {
            id: q.id,
            title: q.title,
            difficulty: q.difficulty,
        })
        .collect();

    Ok(CompanyDetailResponse {
        id: model.id,
        name: model.name,
        slug: model.slug,
        website: model.website,
        questions,
    })
}

/// Get a company with its questions.
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_company(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CompanyDetailResponse>, AppError> {
    let model = find_company(&state.db, id).await?;
    Ok(Json(company_detail(&state.db, model).await?))
}

/// Get a company by slug with its questions.
#[instrument(skip(state, _auth_user), fields(slug = %slug))]
pub async fn get_company_by_slug(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CompanyDetailResponse>, AppError> {
    let model = company::Entity::find()
        .filter(company::Column::Slug.eq(slug.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))?;

    Ok(Json(company_detail(&state.db, model).await?))
}

/// Update a company.
#[instrument(skip(state, _auth_user, payload), fields(id))]
pub async fn update_company(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse>, AppError> {
    validate_update_company(&payload)?;

    let existing = find_company(&state.db, id).await?;
    let mut active: company::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.trim().to_string());
    }
    if let Some(website) = payload.website {
        active.website = Set(website);
    }

    let model = active.update(&state.db).await.map_err(map_slug_conflict)?;

    Ok(Json(CompanyResponse::from(model)))
}

/// Delete a company and its question assignments.
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn delete_company(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    find_company(&txn, id).await?;

    question_company::Entity::delete_many()
        .filter(question_company::Column::CompanyId.eq(id))
        .exec(&txn)
        .await?;
    company::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
