use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{question, submission};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::grading::{self, GradeOutcome};
use crate::models::shared::Pagination;
use crate::models::submission::*;
use crate::state::AppState;

/// Find a question by ID or return 404.
async fn find_question<C: ConnectionTrait>(db: &C, id: i32) -> Result<question::Model, AppError> {
    question::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))
}

/// Find a submission by ID or return 404.
async fn find_submission<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<submission::Model, AppError> {
    submission::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/{id}/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Submit a solution and grade it",
    description = "Creates a submission and grades it synchronously against the question's test cases on the external judge, stopping at the first failing case. Returns 201 with the accepted submission when every case passes, or 200 with the failing case's input, expected output, and the program's stdout.",
    params(("id" = i32, Path, description = "Question ID")),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "All test cases passed", body = SubmissionAcceptedResponse),
        (status = 200, description = "A test case failed", body = SubmissionFailedResponse),
        (status = 400, description = "Validation error or no test cases (VALIDATION_ERROR, NO_TESTCASES)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Judge unavailable (INTERNAL_ERROR); the submission stays pending", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, question_id))]
pub async fn create_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_submission(&payload, state.config.submission.max_code_size)?;

    find_question(&state.db, question_id).await?;

    let outcome = grading::grade(
        &state,
        auth_user.user_id,
        question_id,
        payload.language_id,
        payload.code,
    )
    .await?;

    let response = match outcome {
        GradeOutcome::Accepted { submission } => (
            StatusCode::CREATED,
            Json(SubmissionAcceptedResponse {
                submission: submission.into(),
            }),
        )
            .into_response(),
        GradeOutcome::Failed {
            submission,
            failed_case,
            stdout,
        } => (
            StatusCode::OK,
            Json(SubmissionFailedResponse {
                submission: submission.into(),
                input: failed_case.input,
                output: failed_case.output,
                stdout,
            }),
        )
            .into_response(),
    };
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/v1/submissions",
    tag = "Submissions",
    operation_id = "listMySubmissions",
    summary = "List the authenticated user's submissions, newest first",
    params(SubmissionListQuery),
    responses(
        (status = 200, description = "List of submissions", body = SubmissionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let select = submission::Entity::find()
        .filter(submission::Column::UserId.eq(auth_user.user_id));

    list_submissions(&state.db, select, &query).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/v1/submissions/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get one submission",
    description = "Returns a submission including its source code. Only the submitting user can view it.",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(submission_id = %id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let sub = find_submission(&state.db, id).await?;

    // 404 instead of 403 to avoid leaking that the id exists.
    if sub.user_id != auth_user.user_id {
        return Err(AppError::NotFound("Submission not found".into()));
    }

    Ok(Json(SubmissionResponse::from(sub)))
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/{id}/submissions",
    tag = "Submissions",
    operation_id = "listQuestionSubmissions",
    summary = "List the authenticated user's submissions for one question, newest first",
    params(
        ("id" = i32, Path, description = "Question ID"),
        SubmissionListQuery,
    ),
    responses(
        (status = 200, description = "List of submissions", body = SubmissionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Question not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(question_id))]
pub async fn list_question_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<i32>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    find_question(&state.db, question_id).await?;

    let select = submission::Entity::find()
        .filter(submission::Column::UserId.eq(auth_user.user_id))
        .filter(submission::Column::QuestionId.eq(question_id));

    list_submissions(&state.db, select, &query).await.map(Json)
}

/// Shared pagination tail for submission listings.
async fn list_submissions(
    db: &DatabaseConnection,
    mut select: Select<submission::Entity>,
    query: &SubmissionListQuery,
) -> Result<SubmissionListResponse, AppError> {
    if let Some(status) = query.status {
        select = select.filter(submission::Column::Status.eq(status));
    }

    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let total = select.clone().count(db).await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(submission::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(db)
        .await?
        .into_iter()
        .map(SubmissionListItem::from)
        .collect();

    Ok(SubmissionListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    })
}
