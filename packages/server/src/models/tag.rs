use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::validate_slug;

/// Request body for creating a tag.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTagRequest {
    #[schema(example = "Dynamic Programming")]
    pub name: String,
    #[schema(example = "dynamic-programming")]
    pub slug: String,
}

/// PATCH body for a tag.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<crate::entity::tag::Model> for TagResponse {
    fn from(m: crate::entity::tag::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
        }
    }
}

/// Tag with how many questions carry it.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TagWithCountResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    #[schema(example = 12)]
    pub question_count: u64,
}

/// Tag with its questions, for the detail view.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TagDetailResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub questions: Vec<TagQuestionRef>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TagQuestionRef {
    pub id: i32,
    pub title: String,
    pub difficulty: crate::entity::question::Difficulty,
}

fn validate_tag_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 64 {
        return Err(AppError::Validation("Tag name must be 1-64 characters".into()));
    }
    Ok(())
}

pub fn validate_create_tag(req: &CreateTagRequest) -> Result<(), AppError> {
    validate_tag_name(&req.name)?;
    validate_slug(req.slug.trim())?;
    Ok(())
}

pub fn validate_update_tag(req: &UpdateTagRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_tag_name(name)?;
    }
    if let Some(ref slug) = req.slug {
        validate_slug(slug.trim())?;
    }
    Ok(())
}
