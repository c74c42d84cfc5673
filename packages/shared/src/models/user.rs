use serde::{Deserialize, Serialize};

use crate::models::formats::{option_string_or_number, string_or_number};

pub const ADMIN_ROLE: &str = "Admin";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Profile returned by `GET /profile`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub can_link_accounts: bool,
    #[serde(default)]
    pub invite_code: Option<String>,
    #[serde(deserialize_with = "string_or_number::deserialize")]
    pub personal_household_id: String,
    #[serde(default, deserialize_with = "option_string_or_number::deserialize")]
    pub shared_household_id: Option<String>,
    #[serde(default)]
    pub household_members: Vec<HouseholdMember>,
}

fn default_true() -> bool {
    true
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case(ADMIN_ROLE)
    }
}

/// Row of `GET /admin/users`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub can_link_accounts: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UpdateProfileRequest {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkingPermissionRequest {
    pub can_link: bool,
}
