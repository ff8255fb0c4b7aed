use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// PATCH body for a user profile.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            created_at: m.created_at,
        }
    }
}

/// Per-difficulty solved counts.
#[derive(Serialize, Default, utoipa::ToSchema)]
pub struct DifficultyBreakdown {
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
}

/// Solved count for a tag or company.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SolvedCount {
    pub id: i32,
    pub name: String,
    #[schema(example = 3)]
    pub solved: u64,
}

/// Progress dashboard for one user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub solved: u64,
    pub attempted: u64,
    pub not_attempted: u64,
    /// Difficulty breakdown of solved questions only.
    pub difficulty: DifficultyBreakdown,
    /// Per-tag solved counts.
    pub tags: Vec<SolvedCount>,
    /// Per-company solved counts.
    pub companies: Vec<SolvedCount>,
}

/// One day of submission activity.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ActivityDay {
    #[schema(value_type = String, example = "2025-10-01")]
    pub date: NaiveDate,
    #[schema(example = 4)]
    pub count: i64,
}

/// Submissions-per-day chart data, ascending by date.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ActivityResponse {
    pub submissions: Vec<ActivityDay>,
}

pub fn validate_update_user(req: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(ref username) = req.username {
        let username = username.trim();
        if username.chars().count() < 3 || username.chars().count() > 50 {
            return Err(AppError::Validation(
                "Username must be 3-50 characters".into(),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Validation(
                "Username must contain only letters, digits, and underscores".into(),
            ));
        }
    }
    if let Some(ref email) = req.email {
        let email = email.trim();
        if email.is_empty() || email.len() > 254 || !email.contains('@') {
            return Err(AppError::Validation("Must be a valid email".into()));
        }
    }
    Ok(())
}
