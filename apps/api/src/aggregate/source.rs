use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{
    CertificationRow, EducationRow, EmploymentRow, ItSkillRow, KeySkillRow, LanguageRow,
    PatentRow, PresentationRow, ProfileSummaryRow, ProjectRow, PublicationRow,
    ResumeHeadlineRow, WorkSampleRow,
};
use crate::models::user::{OnlineProfileRow, PersonalDetailsRow, ProfileDetailsRow, UserRow};

/// Everything stored for one user, as raw rows. `user == None` means the
/// user does not exist and every other field is empty.
#[derive(Debug, Clone, Default)]
pub struct UserRecords {
    pub user: Option<UserRow>,
    pub personal: Option<PersonalDetailsRow>,
    pub profile: Option<ProfileDetailsRow>,
    pub summary: Option<ProfileSummaryRow>,
    pub headline: Option<ResumeHeadlineRow>,
    pub languages: Vec<LanguageRow>,
    pub employments: Vec<EmploymentRow>,
    pub educations: Vec<EducationRow>,
    pub key_skills: Vec<KeySkillRow>,
    pub it_skills: Vec<ItSkillRow>,
    pub projects: Vec<ProjectRow>,
    pub certifications: Vec<CertificationRow>,
    pub online_profiles: Vec<OnlineProfileRow>,
    pub work_samples: Vec<WorkSampleRow>,
    pub publications: Vec<PublicationRow>,
    pub presentations: Vec<PresentationRow>,
    pub patents: Vec<PatentRow>,
}

/// Where the aggregator reads a user's records from.
///
/// Carried in `AppState` as `Arc<dyn ProfileSource>`.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<UserRecords, AppError>;
}

/// Postgres-backed source. Section reads run concurrently and outside a
/// transaction; a section written mid-read may or may not be included.
#[derive(Clone)]
pub struct PgProfileSource {
    pool: PgPool,
}

impl PgProfileSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileSource for PgProfileSource {
    async fn load(&self, user_id: Uuid) -> Result<UserRecords, AppError> {
        let pool = &self.pool;

        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, full_name, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let Some(user) = user else {
            debug!("User {user_id} not found; returning empty records");
            return Ok(UserRecords::default());
        };

        let (
            personal,
            profile,
            summary,
            headline,
            languages,
            employments,
            educations,
            key_skills,
            it_skills,
            projects,
            certifications,
            online_profiles,
            work_samples,
            publications,
            presentations,
            patents,
        ) = tokio::try_join!(
            fetch_one_for_user::<PersonalDetailsRow>(
                pool,
                "SELECT * FROM personal_details WHERE user_id = $1 LIMIT 1",
                user_id
            ),
            fetch_one_for_user::<ProfileDetailsRow>(
                pool,
                "SELECT * FROM profile_details WHERE user_id = $1 LIMIT 1",
                user_id
            ),
            fetch_one_for_user::<ProfileSummaryRow>(
                pool,
                "SELECT user_id, summary FROM profile_summaries WHERE user_id = $1 LIMIT 1",
                user_id
            ),
            fetch_one_for_user::<ResumeHeadlineRow>(
                pool,
                "SELECT user_id, headline FROM resume_headlines WHERE user_id = $1 LIMIT 1",
                user_id
            ),
            fetch_all_for_user::<LanguageRow>(
                pool,
                "SELECT * FROM languages WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<EmploymentRow>(
                pool,
                "SELECT * FROM employments WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<EducationRow>(
                pool,
                "SELECT * FROM educations WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<KeySkillRow>(
                pool,
                "SELECT * FROM key_skills WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<ItSkillRow>(
                pool,
                "SELECT * FROM it_skills WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<ProjectRow>(
                pool,
                "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<CertificationRow>(
                pool,
                "SELECT * FROM certifications WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<OnlineProfileRow>(
                pool,
                "SELECT * FROM online_profiles WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<WorkSampleRow>(
                pool,
                "SELECT * FROM work_samples WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<PublicationRow>(
                pool,
                "SELECT * FROM publications WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<PresentationRow>(
                pool,
                "SELECT * FROM presentations WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
            fetch_all_for_user::<PatentRow>(
                pool,
                "SELECT * FROM patents WHERE user_id = $1 ORDER BY created_at",
                user_id
            ),
        )?;

        Ok(UserRecords {
            user: Some(user),
            personal,
            profile,
            summary,
            headline,
            languages,
            employments,
            educations,
            key_skills,
            it_skills,
            projects,
            certifications,
            online_profiles,
            work_samples,
            publications,
            presentations,
            patents,
        })
    }
}

async fn fetch_all_for_user<T>(
    pool: &PgPool,
    sql: &'static str,
    user_id: Uuid,
) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    sqlx::query_as::<_, T>(sql).bind(user_id).fetch_all(pool).await
}

async fn fetch_one_for_user<T>(
    pool: &PgPool,
    sql: &'static str,
    user_id: Uuid,
) -> Result<Option<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    sqlx::query_as::<_, T>(sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
