use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::question::Difficulty;
use crate::error::AppError;

pub use super::shared::{Pagination, escape_like};
use super::shared::{double_option, validate_slug, validate_title};

/// Request body for creating a question together with its statement.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateQuestionRequest {
    /// URL-friendly unique identifier.
    #[schema(example = "two-sum")]
    pub slug: String,
    #[schema(example = "Two Sum")]
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub premium_only: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Percentage 0-100.
    pub acceptance_rate: Option<f64>,
    /// Problem statement in Markdown.
    pub description_md: String,
    pub constraints_md: Option<String>,
    pub hints_md: Option<String>,
}

fn default_true() -> bool {
    true
}

/// PATCH body for a question. Absent fields are left unchanged; explicit
/// nulls clear nullable fields.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateQuestionRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub premium_only: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub acceptance_rate: Option<Option<f64>>,
    pub description_md: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub constraints_md: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub hints_md: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "two-sum")]
    pub slug: String,
    #[schema(example = "Two Sum")]
    pub title: String,
    pub difficulty: Difficulty,
    pub premium_only: bool,
    pub is_active: bool,
    #[schema(example = 45.67)]
    pub acceptance_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::question::Model> for QuestionResponse {
    fn from(m: crate::entity::question::Model) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            title: m.title,
            difficulty: m.difficulty,
            premium_only: m.premium_only,
            is_active: m.is_active,
            acceptance_rate: m.acceptance_rate,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Full statement of a question.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionBodyDto {
    pub description_md: String,
    pub constraints_md: Option<String>,
    pub hints_md: Option<String>,
}

impl From<crate::entity::question_body::Model> for QuestionBodyDto {
    fn from(m: crate::entity::question_body::Model) -> Self {
        Self {
            description_md: m.description_md,
            constraints_md: m.constraints_md,
            hints_md: m.hints_md,
        }
    }
}

/// A public example test case shown in the statement.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SampleTestCase {
    #[schema(example = "1 2")]
    pub input: String,
    #[schema(example = "3")]
    pub output: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TagRef {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyRef {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

/// A question with everything needed to render its page.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionDetailResponse {
    #[serde(flatten)]
    pub question: QuestionResponse,
    pub body: Option<QuestionBodyDto>,
    pub editorial: Option<EditorialResponse>,
    /// Public test cases only; hidden cases are never listed here.
    pub sample_test_cases: Vec<SampleTestCase>,
    pub tags: Vec<TagRef>,
    pub companies: Vec<CompanyRef>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct QuestionListItem {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub premium_only: bool,
    pub is_active: bool,
    pub acceptance_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionListResponse {
    pub data: Vec<QuestionListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct QuestionListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// Filter by difficulty.
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive title search.
    #[param(example = "sum")]
    pub search: Option<String>,
    /// Sort field: `created_at` (default), `updated_at`, `title`.
    pub sort_by: Option<String>,
    /// Sort direction: `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

/// Request body for bulk-adding test cases to a question.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTestCasesRequest {
    pub test_cases: Vec<NewTestCase>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct NewTestCase {
    pub input: String,
    pub expected_output: String,
    /// Public cases are shown in the statement as examples.
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TestCaseResponse {
    pub id: i32,
    pub question_id: i32,
    pub input: String,
    pub expected_output: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::test_case::Model> for TestCaseResponse {
    fn from(m: crate::entity::test_case::Model) -> Self {
        Self {
            id: m.id,
            question_id: m.question_id,
            input: m.input,
            expected_output: m.expected_output,
            is_public: m.is_public,
            created_at: m.created_at,
        }
    }
}

/// PUT body for a question's editorial (upsert).
#[derive(Deserialize, utoipa::ToSchema)]
pub struct EditorialUpsertRequest {
    pub content_md: String,
    pub video_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_official: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EditorialResponse {
    pub id: i32,
    pub question_id: i32,
    pub content_md: String,
    pub video_url: Option<String>,
    pub is_official: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::question_editorial::Model> for EditorialResponse {
    fn from(m: crate::entity::question_editorial::Model) -> Self {
        Self {
            id: m.id,
            question_id: m.question_id,
            content_md: m.content_md,
            video_url: m.video_url,
            is_official: m.is_official,
            created_at: m.created_at,
        }
    }
}

fn validate_acceptance_rate(rate: Option<f64>) -> Result<(), AppError> {
    if let Some(rate) = rate
        && !(0.0..=100.0).contains(&rate)
    {
        return Err(AppError::Validation(
            "Acceptance rate must be between 0 and 100".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_question(req: &CreateQuestionRequest) -> Result<(), AppError> {
    validate_slug(req.slug.trim())?;
    validate_title(&req.title)?;
    validate_acceptance_rate(req.acceptance_rate)?;
    if req.description_md.trim().is_empty() {
        return Err(AppError::Validation("Description is required".into()));
    }
    Ok(())
}

pub fn validate_update_question(req: &UpdateQuestionRequest) -> Result<(), AppError> {
    if let Some(ref slug) = req.slug {
        validate_slug(slug.trim())?;
    }
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(rate) = req.acceptance_rate {
        validate_acceptance_rate(rate)?;
    }
    if let Some(ref description) = req.description_md
        && description.trim().is_empty()
    {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    Ok(())
}

pub fn validate_create_test_cases(req: &CreateTestCasesRequest) -> Result<(), AppError> {
    if req.test_cases.is_empty() {
        return Err(AppError::Validation(
            "At least one test case is required".into(),
        ));
    }
    if req.test_cases.len() > 200 {
        return Err(AppError::Validation(
            "Too many test cases: max 200 per request".into(),
        ));
    }
    Ok(())
}

pub fn validate_editorial(req: &EditorialUpsertRequest) -> Result<(), AppError> {
    if req.content_md.trim().is_empty() {
        return Err(AppError::Validation(
            "Editorial content is required".into(),
        ));
    }
    if let Some(ref url) = req.video_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        return Err(AppError::Validation("Must be a valid video URL".into()));
    }
    Ok(())
}

pub fn validate_question_list_query(query: &QuestionListQuery) -> Result<(), AppError> {
    if let Some(ref sort_by) = query.sort_by {
        const ALLOWED_SORT_FIELDS: &[&str] = &["created_at", "updated_at", "title"];
        if !ALLOWED_SORT_FIELDS.contains(&sort_by.as_str()) {
            return Err(AppError::Validation(format!(
                "Invalid sort_by field '{}'. Allowed: created_at, updated_at, title",
                sort_by
            )));
        }
    }

    if let Some(ref sort_order) = query.sort_order
        && !["asc", "desc"].contains(&sort_order.to_lowercase().as_str())
    {
        return Err(AppError::Validation(
            "sort_order must be 'asc' or 'desc'".into(),
        ));
    }

    Ok(())
}
