use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::submission::SubmissionStatus;
use crate::error::AppError;

use super::shared::Pagination;

/// Request body for submitting a solution to a question.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    /// Judge language identifier (e.g. 54 = C++17, 71 = Python 3).
    #[schema(example = 71)]
    pub language_id: i32,
    /// Source code to grade.
    #[schema(example = "print(sum(map(int, input().split())))")]
    pub code: String,
}

/// Query parameters for submission listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SubmissionListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// Filter by status.
    pub status: Option<SubmissionStatus>,
}

/// Full submission details.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub user_id: i32,
    #[schema(example = 1)]
    pub question_id: i32,
    /// Judge language identifier the code was graded under.
    #[schema(example = "71")]
    pub language: String,
    pub code: String,
    pub status: SubmissionStatus,
    /// Max wall-clock seconds across graded test cases, if graded.
    #[schema(example = 0.014)]
    pub execution_time: Option<f64>,
    /// Max memory in KB across graded test cases, if graded.
    #[schema(example = 3012)]
    pub memory_used: Option<i32>,
    #[schema(example = "2025-10-01T14:30:00Z")]
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::submission::Model> for SubmissionResponse {
    fn from(m: crate::entity::submission::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            question_id: m.question_id,
            language: m.language,
            code: m.code,
            status: m.status,
            execution_time: m.execution_time,
            memory_used: m.memory_used,
            created_at: m.created_at,
        }
    }
}

/// Submission summary for list views (code omitted).
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListItem {
    pub id: i32,
    pub user_id: i32,
    pub question_id: i32,
    pub language: String,
    pub status: SubmissionStatus,
    pub execution_time: Option<f64>,
    pub memory_used: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::submission::Model> for SubmissionListItem {
    fn from(m: crate::entity::submission::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            question_id: m.question_id,
            language: m.language,
            status: m.status,
            execution_time: m.execution_time,
            memory_used: m.memory_used,
            created_at: m.created_at,
        }
    }
}

/// Paginated list of submissions.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListResponse {
    pub data: Vec<SubmissionListItem>,
    pub pagination: Pagination,
}

/// All test cases passed.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionAcceptedResponse {
    pub submission: SubmissionResponse,
}

/// Grading stopped at the first failing test case. The failing case's input
/// and expected output are included for debuggability; note this discloses
/// hidden test-case content on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionFailedResponse {
    pub submission: SubmissionResponse,
    /// Stdin of the failing test case.
    pub input: String,
    /// Expected output of the failing test case.
    pub output: String,
    /// What the submitted program actually printed, as reported by the judge.
    pub stdout: Option<String>,
}

pub fn validate_create_submission(
    req: &CreateSubmissionRequest,
    max_code_size: usize,
) -> Result<(), AppError> {
    if req.code.trim().is_empty() {
        return Err(AppError::Validation("Code is required".into()));
    }
    if req.code.len() > max_code_size {
        return Err(AppError::Validation(format!(
            "Code size ({} bytes) exceeds maximum ({} bytes)",
            req.code.len(),
            max_code_size
        )));
    }
    Ok(())
}
