use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    company, question, question_body, question_company, question_editorial, question_tag,
    submission, tag, test_case, user_question,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::question::*;
use crate::state::AppState;

/// Find a question by ID or return 404.
async fn find_question<C: ConnectionTrait>(db: &C, id: i32) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

/// Map a unique-slug violation onto a client error.
fn map_slug_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A question with this slug already exists".into())
        }
        _ => AppError::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/questions",
    tag = "Questions",
    operation_id = "createQuestion",
    summary = "Create a question",
    description = "Creates a question together with its Markdown statement in one transaction.",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Slug already taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(slug = %payload.slug))]
pub async fn create_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_question(&payload)?;

    let txn = state.db.begin().await?;

    let now = chrono::Utc::now();
    let new_question = question::ActiveModel {
        slug: Set(payload.slug.trim().to_string()),
        title: Set(payload.title.trim().to_string()),
        difficulty: Set(payload.difficulty),
        premium_only: Set(payload.premium_only),
        is_active: Set(payload.is_active),
        acceptance_rate: Set(payload.acceptance_rate),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_question.insert(&txn).await.map_err(map_slug_conflict)?;

    let body = question_body::ActiveModel {
        question_id: Set(model.id),
        description_md: Set(payload.description_md),
        constraints_md: Set(payload.constraints_md),
        hints_md: Set(payload.hints_md),
    };
    body.insert(&txn).await?;

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions",
    tag = "Questions",
    operation_id = "listQuestions",
    summary = "List questions with pagination and search",
    description = "Returns a paginated question catalog with optional difficulty filter, case-insensitive title search, and sorting by `created_at` (default, desc), `updated_at`, or `title`. Statements are omitted from list results.",
    params(QuestionListQuery),
    responses(
        (status = 200, description = "List of questions", body = QuestionListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_questions(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<Json<QuestionListResponse>, AppError> {
    validate_question_list_query(&query)?;

    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = question::Entity::find();

    if let Some(difficulty) = query.difficulty {
        select = select.filter(question::Column::Difficulty.eq(difficulty));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(question::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match query.sort_by.as_deref().unwrap_or("created_at") {
        "updated_at" => question::Column::UpdatedAt,
        "title" => question::Column::Title,
        _ => question::Column::CreatedAt,
    };

    let total = select.clone().count(&state.db).await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by(sort_column, sort_order)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<QuestionListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(QuestionListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}",
    tag = "Questions",
    operation_id = "getQuestion",
    summary = "Get a question with statement, editorial, samples, tags, and companies",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question details", body = QuestionDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<QuestionDetailResponse>, AppError> {
    let model = find_question(&state.db, id).await?;

    let body = question_body::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .map(QuestionBodyDto::from);

    let editorial = question_editorial::Entity::find()
        .filter(question_editorial::Column::QuestionId.eq(id))
        .one(&state.db)
        .await?
        .map(EditorialResponse::from);

    // Only public cases are disclosed in the statement.
    let sample_test_cases = test_case::Entity::find()
        .filter(test_case::Column::QuestionId.eq(id))
        .filter(test_case::Column::IsPublic.eq(true))
        .order_by_asc(test_case::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|tc| SampleTestCase {
            input: tc.input,
            output: tc.expected_output,
        })
        .collect();

    let tags = question_tag::Entity::find()
        .filter(question_tag::Column::QuestionId.eq(id))
        .find_also_related(tag::Entity)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(_, t)| t)
        .map(|t| TagRef {
            id: t.id,
            name: t.name,
            slug: t.slug,
        })
        .collect();

    let companies = question_company::Entity::find()
        .filter(question_company::Column::QuestionId.eq(id))
        .find_also_related(company::Entity)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(_, c)| c)
        .map(|c| CompanyRef {
            id: c.id,
            name: c.name,
            slug: c.slug,
        })
        .collect();

    Ok(Json(QuestionDetailResponse {
        question: QuestionResponse::from(model),
        body,
        editorial,
        sample_test_cases,
        tags,
        companies,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/questions/{id}",
    tag = "Questions",
    operation_id = "updateQuestion",
    summary = "Update a question",
    description = "Partially updates a question and its statement using PATCH semantics — only provided fields are modified.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = UpdateQuestionRequest,
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(id))]
pub async fn update_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<Json<QuestionResponse>, AppError> {
    validate_update_question(&payload)?;

    let txn = state.db.begin().await?;

    let existing = find_question(&txn, id).await?;
    let mut active: question::ActiveModel = existing.into();

    if let Some(ref slug) = payload.slug {
        active.slug = Set(slug.trim().to_string());
    }
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(difficulty) = payload.difficulty {
        active.difficulty = Set(difficulty);
    }
    if let Some(premium_only) = payload.premium_only {
        active.premium_only = Set(premium_only);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(acceptance_rate) = payload.acceptance_rate {
        active.acceptance_rate = Set(acceptance_rate);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(map_slug_conflict)?;

    // Statement fields upsert into question_body (the row may be missing for
    // questions created before statements became mandatory).
    if payload.description_md.is_some()
        || payload.constraints_md.is_some()
        || payload.hints_md.is_some()
    {
        let existing_body = question_body::Entity::find_by_id(id).one(&txn).await?;
        match existing_body {
            Some(body) => {
                let mut body_active: question_body::ActiveModel = body.into();
                if let Some(description) = payload.description_md {
                    body_active.description_md = Set(description);
                }
                if let Some(constraints) = payload.constraints_md {
                    body_active.constraints_md = Set(constraints);
                }
                if let Some(hints) = payload.hints_md {
                    body_active.hints_md = Set(hints);
                }
                body_active.update(&txn).await?;
            }
            None => {
                let body = question_body::ActiveModel {
                    question_id: Set(id),
                    description_md: Set(payload.description_md.unwrap_or_default()),
                    constraints_md: Set(payload.constraints_md.flatten()),
                    hints_md: Set(payload.hints_md.flatten()),
                };
                body.insert(&txn).await?;
            }
        }
    }

    txn.commit().await?;

    Ok(Json(QuestionResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}",
    tag = "Questions",
    operation_id = "deleteQuestion",
    summary = "Delete a question",
    description = "Permanently deletes a question and cascade-deletes its statement, editorial, test cases, submissions, progress rows, and tag/company assignments.",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn delete_question(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    find_question(&txn, id).await?;

    submission::Entity::delete_many()
        .filter(submission::Column::QuestionId.eq(id))
        .exec(&txn)
        .await?;
    user_question::Entity::delete_many()
        .filter(user_question::Column::QuestionId.eq(id))
        .exec(&txn)
        .await?;
    test_case::Entity::delete_many()
        .filter(test_case::Column::QuestionId.eq(id))
        .exec(&txn)
        .await?;
    question_tag::Entity::delete_many()
        .filter(question_tag::Column::QuestionId.eq(id))
        .exec(&txn)
        .await?;
    question_company::Entity::delete_many()
        .filter(question_company::Column::QuestionId.eq(id))
        .exec(&txn)
        .await?;
    question_editorial::Entity::delete_many()
        .filter(question_editorial::Column::QuestionId.eq(id))
        .exec(&txn)
        .await?;
    question_body::Entity::delete_many()
        .filter(question_body::Column::QuestionId.eq(id))
        .exec(&txn)
        .await?;
    question::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/test-cases",
    tag = "Test Cases",
    operation_id = "createTestCases",
    summary = "Add test cases to a question",
    description = "Bulk-adds test cases. The grading cache is not invalidated: already-cached sets may be served for up to the cache TTL.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = CreateTestCasesRequest,
    responses(
        (status = 201, description = "Test cases created", body = Vec<TestCaseResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, payload), fields(question_id))]
pub async fn create_test_cases(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
    AppJson(payload): AppJson<CreateTestCasesRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_test_cases(&payload)?;

    let txn = state.db.begin().await?;
    find_question(&txn, question_id).await?;

    let now = chrono::Utc::now();
    let mut created = Vec::with_capacity(payload.test_cases.len());
    for tc in payload.test_cases {
        let model = test_case::ActiveModel {
            input: Set(tc.input),
            expected_output: Set(tc.expected_output),
            is_public: Set(tc.is_public),
            question_id: Set(question_id),
            created_at: Set(now),
            ..Default::default()
        };
        created.push(TestCaseResponse::from(model.insert(&txn).await?));
    }

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}/test-cases",
    tag = "Test Cases",
    operation_id = "listTestCases",
    summary = "List all test cases of a question, including hidden ones",
    params(("id" = i32, Path, description = "Question ID")),
    responses(
        (status = 200, description = "List of test cases", body = Vec<TestCaseResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(question_id))]
pub async fn list_test_cases(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
) -> Result<Json<Vec<TestCaseResponse>>, AppError> {
    find_question(&state.db, question_id).await?;

    let rows = test_case::Entity::find()
        .filter(test_case::Column::QuestionId.eq(question_id))
        .order_by_asc(test_case::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(TestCaseResponse::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}/test-cases/{tc_id}",
    tag = "Test Cases",
    operation_id = "deleteTestCase",
    summary = "Delete a test case",
    params(
        ("id" = i32, Path, description = "Question ID"),
        ("tc_id" = i32, Path, description = "Test case ID"),
    ),
    responses(
        (status = 204, description = "Test case deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question or test case not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(question_id, tc_id))]
pub async fn delete_test_case(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((question_id, tc_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let tc = test_case::Entity::find_by_id(tc_id)
        .one(&state.db)
        .await?
        .filter(|tc| tc.question_id == question_id)
        .ok_or_else(|| AppError::NotFound("Test case not found".into()))?;

    test_case::Entity::delete_by_id(tc.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get a question's editorial.
#[instrument(skip(state, _auth_user), fields(question_id))]
pub async fn get_editorial(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
) -> Result<Json<EditorialResponse>, AppError> {
    find_question(&state.db, question_id).await?;

    let editorial = question_editorial::Entity::find()
        .filter(question_editorial::Column::QuestionId.eq(question_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Editorial not found".into()))?;

    Ok(Json(EditorialResponse::from(editorial)))
}

/// Create or replace a question's editorial.
#[instrument(skip(state, _auth_user, payload), fields(question_id))]
pub async fn put_editorial(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
    AppJson(payload): AppJson<EditorialUpsertRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_editorial(&payload)?;

    let txn = state.db.begin().await?;
    find_question(&txn, question_id).await?;

    let existing = question_editorial::Entity::find()
        .filter(question_editorial::Column::QuestionId.eq(question_id))
        .one(&txn)
        .await?;

    let (model, created) = match existing {
        Some(editorial) => {
            let mut active: question_editorial::ActiveModel = editorial.into();
            active.content_md = Set(payload.content_md);
            active.video_url = Set(payload.video_url);
            active.is_official = Set(payload.is_official);
            (active.update(&txn).await?, false)
        }
        None => {
            let active = question_editorial::ActiveModel {
                question_id: Set(question_id),
                content_md: Set(payload.content_md),
                video_url: Set(payload.video_url),
                is_official: Set(payload.is_official),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            };
            (active.insert(&txn).await?, true)
        }
    };

    txn.commit().await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(EditorialResponse::from(model))))
}

/// Assign a tag to a question.
#[instrument(skip(state, _auth_user), fields(question_id, tag_id))]
pub async fn assign_tag(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((question_id, tag_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    find_question(&state.db, question_id).await?;
    tag::Entity::find_by_id(tag_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tag not found".into()))?;

    let model = question_tag::ActiveModel {
        question_id: Set(question_id),
        tag_id: Set(tag_id),
    };
    let result = question_tag::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                question_tag::Column::QuestionId,
                question_tag::Column::TagId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await;

    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into()),
    }
}

/// Remove a tag from a question.
#[instrument(skip(state, _auth_user), fields(question_id, tag_id))]
pub async fn unassign_tag(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((question_id, tag_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let result = question_tag::Entity::delete_many()
        .filter(question_tag::Column::QuestionId.eq(question_id))
        .filter(question_tag::Column::TagId.eq(tag_id))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Tag assignment not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Assign a company to a question.
#[instrument(skip(state, _auth_user), fields(question_id, company_id))]
pub async fn assign_company(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((question_id, company_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    find_question(&state.db, question_id).await?;
    company::Entity::find_by_id(company_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".into()))?;

    let model = question_company::ActiveModel {
        question_id: Set(question_id),
        company_id: Set(company_id),
    };
    let result = question_company::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                question_company::Column::QuestionId,
                question_company::Column::CompanyId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&state.db)
        .await;

    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into()),
    }
}

/// Remove a company from a question.
#[instrument(skip(state, _auth_user), fields(question_id, company_id))]
pub async fn unassign_company(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((question_id, company_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let result = question_company::Entity::delete_many()
        .filter(question_company::Column::QuestionId.eq(question_id))
        .filter(question_company::Column::CompanyId.eq(company_id))
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Company assignment not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
