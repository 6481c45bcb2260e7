use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// The authenticated principal as returned by `GET /api/auth/me`. Profile
/// fields are nullable until the user fills in their listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub experience_years: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub about: Option<String>,
    pub is_hidden: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: Option<Identity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// One authoritative snapshot of a paginated listing response. Never mutated
/// locally, only replaced wholesale by the next server response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    /// Server-owned; the client never derives page counts from it.
    #[serde(default)]
    pub per_page: Option<u32>,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Public listing row from `GET /api/profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub experience_years: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub about: Option<String>,
}

/// Administration listing row from `GET /api/admin/users`; `id` is the
/// stable key for edit/delete targeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUserRow {
    pub id: UserId,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub experience_years: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub about: Option<String>,
    pub is_hidden: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `PUT /api/me/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub service_type: String,
    pub experience_years: i64,
    pub price: i64,
    pub about: String,
}

/// Body of `PUT /api/admin/users/{id}`: the full editable field set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserUpdate {
    pub name: String,
    pub service_type: String,
    pub experience_years: i64,
    pub price: i64,
    pub about: String,
    pub is_hidden: bool,
}
