// Aggregator: reads every section a user owns and folds it into one ResumeData.
// Rebuilt from scratch on every request; nothing is cached.

pub mod builder;
pub mod contact;
pub mod models;
pub mod skills;
pub mod source;

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

pub use builder::build_resume_data;
pub use models::ResumeData;
pub use source::{PgProfileSource, ProfileSource, UserRecords};

/// Loads and aggregates a user's resume data. Storage errors propagate;
/// absent sections do not.
pub async fn aggregate_user(
    source: &dyn ProfileSource,
    user_id: Uuid,
) -> Result<ResumeData, AppError> {
    let records = source.load(user_id).await?;
    let data = build_resume_data(&records);
    info!(
        user_id = %user_id,
        user_found = records.user.is_some(),
        experience = data.experience.len(),
        skills = data.skills.len(),
        "Aggregated resume data"
    );
    Ok(data)
}
