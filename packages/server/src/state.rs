use std::sync::Arc;

use judge_client::JudgeClient;
use sea_orm::DatabaseConnection;

use crate::cache::TestcaseCache;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: Arc<dyn TestcaseCache>,
    pub judge: Arc<dyn JudgeClient>,
    pub config: AppConfig,
}
