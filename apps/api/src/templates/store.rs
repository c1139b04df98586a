use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::template::{TemplateRow, TemplateSummary};

/// Read access to the template catalogue plus the download counter.
///
/// Carried in `AppState` as `Arc<dyn TemplateStore>`.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Summaries ordered by rating (best first), then name.
    async fn list(&self, category: Option<&str>) -> Result<Vec<TemplateSummary>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<TemplateRow>, AppError>;

    async fn record_download(&self, id: Uuid) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgTemplateStore {
    pool: PgPool,
}

impl PgTemplateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for PgTemplateStore {
    async fn list(&self, category: Option<&str>) -> Result<Vec<TemplateSummary>, AppError> {
        Ok(sqlx::query_as::<_, TemplateSummary>(
            r#"
            SELECT id, name, category, industry, rating, features, download_count
            FROM templates
            WHERE $1::TEXT IS NULL OR LOWER(category) = LOWER($1)
            ORDER BY rating DESC, name ASC
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get(&self, id: Uuid) -> Result<Option<TemplateRow>, AppError> {
        Ok(
            sqlx::query_as::<_, TemplateRow>("SELECT * FROM templates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn record_download(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE templates SET download_count = download_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
