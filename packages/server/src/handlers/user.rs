use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::question::Difficulty;
use crate::entity::user_question::ProgressStatus;
use crate::entity::{
    company, question, question_company, question_tag, submission, tag, user, user_question,
};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::user::*;
use crate::state::AppState;

/// Find a user by ID or return 404.
async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Get a user's public profile.
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_user(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let model = find_user(&state.db, id).await?;
    Ok(Json(UserResponse::from(model)))
}

/// Update the caller's own profile.
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if auth_user.user_id != id {
        return Err(AppError::PermissionDenied);
    }
    validate_update_user(&payload)?;

    let existing = find_user(&state.db, id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(ref username) = payload.username {
        active.username = Set(username.trim().to_string());
    }
    if let Some(ref email) = payload.email {
        active.email = Set(email.trim().to_string());
    }

    let model = active
        .update(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                if detail.contains("email") {
                    AppError::Conflict("Email is already registered".into())
                } else {
                    AppError::UsernameTaken
                }
            }
            _ => AppError::from(e),
        })?;

    Ok(Json(UserResponse::from(model)))
}

/// Delete the caller's own account and everything attached to it.
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if auth_user.user_id != id {
        return Err(AppError::PermissionDenied);
    }

    let txn = state.db.begin().await?;

    find_user(&txn, id).await?;

    submission::Entity::delete_many()
        .filter(submission::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    user_question::Entity::delete_many()
        .filter(user_question::Column::UserId.eq(id))
        .exec(&txn)
        .await?;
    user::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Progress dashboard: status counts, per-difficulty solved breakdown, and
/// per-tag / per-company solved counts.
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_dashboard(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DashboardResponse>, AppError> {
    find_user(&state.db, id).await?;

    let progress: Vec<(user_question::Model, Option<question::Model>)> =
        user_question::Entity::find()
            .filter(user_question::Column::UserId.eq(id))
            .find_also_related(question::Entity)
            .all(&state.db)
            .await?;

    if progress.is_empty() {
        return Ok(Json(DashboardResponse {
            solved: 0,
            attempted: 0,
            not_attempted: 0,
            difficulty: DifficultyBreakdown::default(),
            tags: vec![],
            companies: vec![],
        }));
    }

    let mut solved = 0;
    let mut attempted = 0;
    let mut not_attempted = 0;
    let mut difficulty = DifficultyBreakdown::default();
    let mut solved_ids: HashSet<i32> = HashSet::new();

    for (row, question) in &progress {
        match row.status {
            ProgressStatus::Solved => {
                solved += 1;
                solved_ids.insert(row.question_id);
                if let Some(q) = question {
                    match q.difficulty {
                        Difficulty::Easy => difficulty.easy += 1,
                        Difficulty::Medium => difficulty.medium += 1,
                        Difficulty::Hard => difficulty.hard += 1,
                    }
                }
            }
            ProgressStatus::Attempted => attempted += 1,
            ProgressStatus::NotAttempted => not_attempted += 1,
        }
    }

    // Per-tag / per-company solved counts, aggregated in memory over the
    // solved set rather than with a grouped join per dimension.
    let mut tag_counts: HashMap<i32, u64> = HashMap::new();
    if !solved_ids.is_empty() {
        for assignment in question_tag::Entity::find()
            .filter(question_tag::Column::QuestionId.is_in(solved_ids.iter().copied()))
            .all(&state.db)
            .await?
        {
            *tag_counts.entry(assignment.tag_id).or_default() += 1;
        }
    }

    let tags = if tag_counts.is_empty() {
        vec![]
    } else {
        tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_counts.keys().copied()))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|t| SolvedCount {
                solved: tag_counts.get(&t.id).copied().unwrap_or(0),
                id: t.id,
                name: t.name,
            })
            .collect()
    };

    let mut company_counts: HashMap<i32, u64> = HashMap::new();
    if !solved_ids.is_empty() {
        for assignment in question_company::Entity::find()
            .filter(question_company::Column::QuestionId.is_in(solved_ids.iter().copied()))
            .all(&state.db)
            .await?
        {
            *company_counts.entry(assignment.company_id).or_default() += 1;
        }
    }

    let companies = if company_counts.is_empty() {
        vec![]
    } else {
        company::Entity::find()
            .filter(company::Column::Id.is_in(company_counts.keys().copied()))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|c| SolvedCount {
                solved: company_counts.get(&c.id).copied().unwrap_or(0),
                id: c.id,
                name: c.name,
            })
            .collect()
    };

    Ok(Json(DashboardResponse {
        solved,
        attempted,
        not_attempted,
        difficulty,
        tags,
        companies,
    }))
}

#[derive(FromQueryResult)]
struct ActivityRow {
    date: chrono::NaiveDate,
    count: i64,
}

/// Submissions-per-day activity chart, ascending by date.
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_activity(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ActivityResponse>, AppError> {
    find_user(&state.db, id).await?;

    let day = Expr::cust(r#"CAST("created_at" AS DATE)"#);

    let rows = submission::Entity::find()
        .select_only()
        .column_as(day.clone(), "date")
        .column_as(submission::Column::Id.count(), "count")
        .filter(submission::Column::UserId.eq(id))
        .group_by(day.clone())
        .order_by_asc(day)
        .into_model::<ActivityRow>()
        .all(&state.db)
        .await?;

    Ok(Json(ActivityResponse {
        submissions: rows
            .into_iter()
            .map(|r| ActivityDay {
                date: r.date,
                count: r.count,
            })
            .collect(),
    }))
}
