use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Core account record. `email` is the preferred contact address.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct PersonalDetailsRow {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// Relative path under the assets directory.
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ProfileDetailsRow {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub current_designation: Option<String>,
}

/// A link the user attached to their profile (LinkedIn, GitHub, portfolio, ...).
/// `profile_type` is free text typed by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct OnlineProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_type: String,
    pub url: String,
    pub description: Option<String>,
}
