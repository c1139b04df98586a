use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored resume layout: HTML with handlebars placeholders plus catalogue metadata.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub industry: Option<String>,
    pub rating: f64,
    pub features: Vec<String>,
    pub html: String,
    pub download_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalogue entry without the (large) HTML body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateSummary {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub industry: Option<String>,
    pub rating: f64,
    pub features: Vec<String>,
    pub download_count: i64,
}

impl From<&TemplateRow> for TemplateSummary {
    fn from(row: &TemplateRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            category: row.category.clone(),
            industry: row.industry.clone(),
            rating: row.rating,
            features: row.features.clone(),
            download_count: row.download_count,
        }
    }
}
