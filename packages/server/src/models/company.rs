use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{Pagination, validate_slug};

/// Request body for creating a company.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCompanyRequest {
    #[schema(example = "Acme Corp")]
    pub name: String,
    #[schema(example = "acme-corp")]
    pub slug: String,
    #[schema(example = "https://acme.example.com")]
    pub website: Option<String>,
}

/// PATCH body for a company.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "super::shared::double_option")]
    #[schema(value_type = Option<String>)]
    pub website: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub website: Option<String>,
}

impl From<crate::entity::company::Model> for CompanyResponse {
    fn from(m: crate::entity::company::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            website: m.website,
        }
    }
}

/// Company with its tagged questions, for the detail views.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyDetailResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub website: Option<String>,
    pub questions: Vec<CompanyQuestionRef>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyQuestionRef {
    pub id: i32,
    pub title: String,
    pub difficulty: crate::entity::question::Difficulty,
}

/// Paginated company list, ordered by name.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CompanyListResponse {
    pub data: Vec<CompanyResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CompanyListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

fn validate_company_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 128 {
        return Err(AppError::Validation(
            "Company name must be 1-128 characters".into(),
        ));
    }
    Ok(())
}

fn validate_website(website: &str) -> Result<(), AppError> {
    if !(website.starts_with("http://") || website.starts_with("https://")) {
        return Err(AppError::Validation("Must be a valid URL".into()));
    }
    Ok(())
}

pub fn validate_create_company(req: &CreateCompanyRequest) -> Result<(), AppError> {
    validate_company_name(&req.name)?;
    validate_slug(req.slug.trim())?;
    if let Some(ref website) = req.website {
        validate_website(website)?;
    }
    Ok(())
}

pub fn validate_update_company(req: &UpdateCompanyRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_company_name(name)?;
    }
    if let Some(ref slug) = req.slug {
        validate_slug(slug.trim())?;
    }
    if let Some(Some(ref website)) = req.website {
        validate_website(website)?;
    }
    Ok(())
}
