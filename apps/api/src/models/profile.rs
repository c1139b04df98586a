//! Row types for the per-section resume records. Every table is keyed by
//! `user_id`; the aggregator reads them and never writes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ProfileSummaryRow {
    pub user_id: Uuid,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ResumeHeadlineRow {
    pub user_id: Uuid,
    pub headline: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct LanguageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub language: String,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct EmploymentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub designation: String,
    pub company: String,
    pub employment_type: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub degree: String,
    pub institution: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct KeySkillRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ItSkillRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub version: Option<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub role: Option<String>,
    pub url: Option<String>,
    /// Entries may themselves be comma separated ("Rust, Axum").
    pub technologies: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct CertificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub issuer: Option<String>,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct WorkSampleRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct PublicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub published_on: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct PresentationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct PatentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub patent_office: Option<String>,
    pub application_number: Option<String>,
    pub status: Option<String>,
    pub issued_on: Option<NaiveDate>,
    pub url: Option<String>,
    pub description: Option<String>,
}
