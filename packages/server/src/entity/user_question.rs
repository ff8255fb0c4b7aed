use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// Per-(user, question) progress. Intended to only ever improve:
/// `not_attempted` -> `attempted` -> `solved`. A later failing submission
/// never demotes `solved` (enforced with a conditional update in grading).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[sea_orm(string_value = "not_attempted")]
    NotAttempted,
    #[sea_orm(string_value = "attempted")]
    Attempted,
    #[sea_orm(string_value = "solved")]
    Solved,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAttempted => "not_attempted",
            Self::Attempted => "attempted",
            Self::Solved => "solved",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(primary_key)]
    pub question_id: i32,

    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::question::Entity>,

    pub status: ProgressStatus,
    /// Set when the question is first solved; NULL while only attempted.
    pub last_solved_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
