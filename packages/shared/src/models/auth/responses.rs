use serde::{Deserialize, Serialize};

use crate::models::formats::option_string_or_number;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Claims carried by the session token. Each claim may arrive under its
/// short name, its URI-style name, or both; the short name wins.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawTokenClaims")]
pub struct TokenClaims {
    pub sub: String, // subject (user ID)
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "householdId")]
    pub household_id: Option<String>,
    pub exp: i64, // expiration time
}

#[derive(Deserialize)]
struct RawTokenClaims {
    #[serde(default, deserialize_with = "option_string_or_number::deserialize")]
    sub: Option<String>,
    #[serde(
        default,
        rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
        deserialize_with = "option_string_or_number::deserialize"
    )]
    name_identifier: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(
        default,
        rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress"
    )]
    email_address: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(
        default,
        rename = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role"
    )]
    role_uri: Option<String>,
    #[serde(
        default,
        rename = "householdId",
        deserialize_with = "option_string_or_number::deserialize"
    )]
    household_id: Option<String>,
    #[serde(
        default,
        rename = "household_id",
        deserialize_with = "option_string_or_number::deserialize"
    )]
    household_id_snake: Option<String>,
    exp: i64,
}

impl TryFrom<RawTokenClaims> for TokenClaims {
    type Error = String;

    fn try_from(raw: RawTokenClaims) -> Result<Self, Self::Error> {
        let sub = raw
            .sub
            .or(raw.name_identifier)
            .ok_or_else(|| "missing subject claim".to_string())?;
        Ok(TokenClaims {
            sub,
            email: raw.email.or(raw.email_address),
            role: raw.role.or(raw.role_uri),
            household_id: raw.household_id.or(raw.household_id_snake),
            exp: raw.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_accept_uri_style_keys() {
        let json = r#"{
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier": "5",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress": "ana@example.com",
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "Admin",
            "householdId": 11,
            "exp": 1900000000
        }"#;

        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "5");
        assert_eq!(claims.email.as_deref(), Some("ana@example.com"));
        assert_eq!(claims.role.as_deref(), Some("Admin"));
        assert_eq!(claims.household_id.as_deref(), Some("11"));
    }

    #[test]
    fn test_claims_short_keys() {
        let json = r#"{"sub": 5, "role": "User", "exp": 1}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "5");
        assert_eq!(claims.household_id, None);
        assert_eq!(claims.email, None);
    }

    #[test]
    fn test_claims_with_both_key_styles_prefer_short_names() {
        let json = r#"{
            "sub": "5",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier": "7",
            "role": "User",
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "Admin",
            "householdId": "11",
            "household_id": 12,
            "exp": 1900000000
        }"#;

        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "5");
        assert_eq!(claims.role.as_deref(), Some("User"));
        assert_eq!(claims.household_id.as_deref(), Some("11"));
    }

    #[test]
    fn test_claims_without_subject_are_rejected() {
        let json = r#"{"role": "User", "exp": 1}"#;
        assert!(serde_json::from_str::<TokenClaims>(json).is_err());
    }
}
