use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Full problem statement, split out of `question` so list queries stay lean.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question_body")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub question_id: i32,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::question::Entity>,

    #[sea_orm(column_type = "Text")]
    pub description_md: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub constraints_md: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub hints_md: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
