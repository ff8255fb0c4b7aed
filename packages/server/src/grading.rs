//! The submission grading workflow: turn one code submission into a graded
//! result by running it against the question's test cases on the external
//! judge, stopping at the first failure.

use chrono::Utc;
use judge_client::EvaluationRequest;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::cache::{CacheError, TestcaseCache};
use crate::entity::submission::{self, SubmissionStatus};
use crate::entity::test_case;
use crate::entity::user_question::{self, ProgressStatus};
use crate::error::AppError;
use crate::state::AppState;

/// A test case as grading consumes it (and as it is stored in the cache):
/// stdin plus expected stdout, nothing else.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct GradingTestCase {
    pub input: String,
    pub output: String,
}

/// Result of grading one submission.
pub enum GradeOutcome {
    /// Every test case passed.
    Accepted { submission: submission::Model },
    /// Grading stopped at the first failing case; later cases were not run.
    Failed {
        submission: submission::Model,
        failed_case: GradingTestCase,
        stdout: Option<String>,
    },
}

fn cache_key(question_id: i32) -> String {
    format!("question:{question_id}:testcases")
}

/// Map a judge verdict string onto a submission status. Judge0 suffixes
/// runtime errors with the signal/exit detail ("Runtime Error (NZEC)"), so
/// that family is matched by prefix. Anything else non-accepted counts as a
/// wrong answer.
fn classify_verdict(verdict: &str) -> SubmissionStatus {
    match verdict {
        "Compilation Error" => SubmissionStatus::CompilationError,
        "Time Limit Exceeded" => SubmissionStatus::TimeLimitExceeded,
        v if v.starts_with("Runtime Error") => SubmissionStatus::RuntimeError,
        _ => SubmissionStatus::WrongAnswer,
    }
}

/// Resolve a question's test cases, cache first.
///
/// On a miss the full set is read from the database in id order and written
/// through with the configured TTL, so the cached snapshot and the database
/// agree on which cases exist (staleness within the TTL is accepted; there is
/// no invalidation hook when test cases are edited).
pub async fn load_test_cases(
    db: &DatabaseConnection,
    cache: &dyn TestcaseCache,
    ttl_secs: u64,
    question_id: i32,
) -> Result<Vec<GradingTestCase>, AppError> {
    let key = cache_key(question_id);

    if let Some(cached) = cache.get(&key).await? {
        let test_cases = serde_json::from_str(&cached).map_err(CacheError::Decode)?;
        return Ok(test_cases);
    }

    let test_cases: Vec<GradingTestCase> = test_case::Entity::find()
        .filter(test_case::Column::QuestionId.eq(question_id))
        .select_only()
        .column(test_case::Column::Input)
        .column_as(test_case::Column::ExpectedOutput, "output")
        .order_by_asc(test_case::Column::Id)
        .into_model::<GradingTestCase>()
        .all(db)
        .await?;

    if test_cases.is_empty() {
        return Err(AppError::NoTestcases);
    }

    let encoded = serde_json::to_string(&test_cases).map_err(CacheError::Decode)?;
    cache.set_ex(&key, &encoded, ttl_secs).await?;

    Ok(test_cases)
}

/// Create the progress row for (user, question) as `attempted` if it does not
/// exist yet. Concurrent first submissions race benignly: the conflict loser
/// is a no-op.
async fn ensure_progress(
    db: &DatabaseConnection,
    user_id: i32,
    question_id: i32,
) -> Result<(), AppError> {
    let model = user_question::ActiveModel {
        user_id: Set(user_id),
        question_id: Set(question_id),
        status: Set(ProgressStatus::Attempted),
        last_solved_at: Set(None),
    };

    let result = user_question::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                user_question::Column::UserId,
                user_question::Column::QuestionId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Demote progress to `attempted` unless it is already `solved`. The guard
/// is part of the UPDATE's WHERE clause: there is no read-then-write window
/// in which a concurrent accepted submission could be overwritten.
async fn mark_attempted(
    db: &DatabaseConnection,
    user_id: i32,
    question_id: i32,
) -> Result<(), AppError> {
    user_question::Entity::update_many()
        .col_expr(
            user_question::Column::Status,
            Expr::value(ProgressStatus::Attempted),
        )
        .filter(user_question::Column::UserId.eq(user_id))
        .filter(user_question::Column::QuestionId.eq(question_id))
        .filter(user_question::Column::Status.ne(ProgressStatus::Solved))
        .exec(db)
        .await?;
    Ok(())
}

/// Upgrade progress to `solved` and stamp `last_solved_at`.
async fn mark_solved(
    db: &DatabaseConnection,
    user_id: i32,
    question_id: i32,
) -> Result<(), AppError> {
    user_question::Entity::update_many()
        .col_expr(
            user_question::Column::Status,
            Expr::value(ProgressStatus::Solved),
        )
        .col_expr(
            user_question::Column::LastSolvedAt,
            Expr::value(Some(Utc::now())),
        )
        .filter(user_question::Column::UserId.eq(user_id))
        .filter(user_question::Column::QuestionId.eq(question_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Move a submission to its terminal status with the accumulated maxima.
async fn finalize_submission(
    db: &DatabaseConnection,
    id: i32,
    status: SubmissionStatus,
    execution_time: f64,
    memory_used: f64,
) -> Result<submission::Model, AppError> {
    let update = submission::ActiveModel {
        id: Set(id),
        status: Set(status),
        execution_time: Set(Some(execution_time)),
        memory_used: Set(Some(memory_used.round() as i32)),
        ..Default::default()
    };
    Ok(update.update(db).await?)
}

/// Grade one submission end to end.
///
/// A `pending` submission row is inserted before anything else so a crash or
/// judge failure mid-grading leaves an inspectable record; there is no
/// automatic reconciliation of such rows. Test cases are then evaluated
/// sequentially on the judge, stopping at the first failure. No transaction
/// spans the sequence: each row touch is individually atomic.
#[instrument(skip(state, code))]
pub async fn grade(
    state: &AppState,
    user_id: i32,
    question_id: i32,
    language_id: i32,
    code: String,
) -> Result<GradeOutcome, AppError> {
    let db = &state.db;

    let pending = submission::ActiveModel {
        language: Set(language_id.to_string()),
        code: Set(code),
        status: Set(SubmissionStatus::Pending),
        user_id: Set(user_id),
        question_id: Set(question_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let submitted = pending.insert(db).await?;

    let test_cases = load_test_cases(
        db,
        state.cache.as_ref(),
        state.config.cache.testcase_ttl_secs,
        question_id,
    )
    .await?;

    ensure_progress(db, user_id, question_id).await?;

    // Running maxima across all cases evaluated so far.
    let mut execution_time: f64 = 0.0;
    let mut memory_used: f64 = 0.0;

    for tc in &test_cases {
        let evaluation = state
            .judge
            .evaluate(&EvaluationRequest {
                source_code: &submitted.code,
                language_id,
                stdin: &tc.input,
                expected_output: &tc.output,
            })
            .await?;

        execution_time = execution_time.max(evaluation.time.unwrap_or(0.0));
        memory_used = memory_used.max(evaluation.memory.unwrap_or(0.0));

        if !evaluation.is_accepted() {
            let status = classify_verdict(&evaluation.verdict);
            let graded =
                finalize_submission(db, submitted.id, status, execution_time, memory_used).await?;
            mark_attempted(db, user_id, question_id).await?;

            info!(
                submission_id = graded.id,
                verdict = %evaluation.verdict,
                status = %status,
                "Submission failed"
            );
            return Ok(GradeOutcome::Failed {
                submission: graded,
                failed_case: tc.clone(),
                stdout: evaluation.stdout,
            });
        }
    }

    let graded = finalize_submission(
        db,
        submitted.id,
        SubmissionStatus::Accepted,
        execution_time,
        memory_used,
    )
    .await?;
    mark_solved(db, user_id, question_id).await?;

    info!(submission_id = graded.id, "Submission accepted");
    Ok(GradeOutcome::Accepted { submission: graded })
}
