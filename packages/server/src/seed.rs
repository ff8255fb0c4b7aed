use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{submission, test_case};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for submission listings and the per-day activity query:
    // SELECT ... FROM submission WHERE user_id = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_user_created")
        .table(submission::Entity)
        .col(submission::Column::UserId)
        .col(submission::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_submission_user_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_submission_user_created: {}", e);
        }
    }

    // Composite index for the grading read path:
    // SELECT input, expected_output FROM test_case WHERE question_id = ? ORDER BY id
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_test_case_question_id")
        .table(test_case::Entity)
        .col(test_case::Column::QuestionId)
        .col(test_case::Column::Id)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_test_case_question_id exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_test_case_question_id: {}", e);
        }
    }

    // Index for per-question submission listings.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_question_created")
        .table(submission::Entity)
        .col(submission::Column::QuestionId)
        .col(submission::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_submission_question_created exists");
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create index idx_submission_question_created: {}",
                e
            );
        }
    }

    Ok(())
}
