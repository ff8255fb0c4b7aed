use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Difficulty rating shown in the catalog.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[sea_orm(string_value = "easy")]
    Easy,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "hard")]
    Hard,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// URL-friendly unique identifier (e.g. "two-sum").
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub premium_only: bool,
    pub is_active: bool,
    /// Percentage 0-100, recomputed offline.
    pub acceptance_rate: Option<f64>,

    #[sea_orm(has_one)]
    pub body: HasOne<super::question_body::Entity>,

    #[sea_orm(has_one)]
    pub editorial: HasOne<super::question_editorial::Entity>,

    #[sea_orm(has_many)]
    pub test_cases: HasMany<super::test_case::Entity>,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    #[sea_orm(has_many)]
    pub progress: HasMany<super::user_question::Entity>,

    #[sea_orm(has_many, via = "question_tag")]
    pub tags: HasMany<super::tag::Entity>,

    #[sea_orm(has_many, via = "question_company")]
    pub companies: HasMany<super::company::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
