//! Session, profile and wire types for the dashboard API

use crate::coerce;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Dashboard user role
///
/// Used for navigation only; the API enforces authorization on every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Engineer,
    Utility,
    Qac,
    Division,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Engineer => "engineer",
            Role::Utility => "utility",
            Role::Qac => "qac",
            Role::Division => "division",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "engineer" => Role::Engineer,
            "utility" => Role::Utility,
            "qac" => Role::Qac,
            "division" => Role::Division,
            _ => Role::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<i64>,
    pub username: String,
    pub role: Option<Role>,
    pub division: Option<String>,
    pub full_name: Option<String>,
}

/// Access + refresh token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Snapshot of the client-side session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// HTTP methods accepted by protected calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl ApiMethod {
    /// POST and PATCH must carry a JSON body
    pub fn requires_body(self) -> bool {
        matches!(self, ApiMethod::Post | ApiMethod::Patch)
    }
}

impl From<ApiMethod> for reqwest::Method {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => reqwest::Method::GET,
            ApiMethod::Post => reqwest::Method::POST,
            ApiMethod::Patch => reqwest::Method::PATCH,
            ApiMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Patch => "PATCH",
            ApiMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: UserProfile,
    /// Route the UI should navigate to for this user's role
    pub landing_route: &'static str,
}

// Wire types

#[derive(Debug, Serialize)]
pub(crate) struct TokenObtainRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenObtainResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
    /// Present when the server rotates refresh tokens
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileSection {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub division: Value,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// `/me/` body; accepts both the nested `userprofile` shape and the flat one
#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub division: Value,
    #[serde(default)]
    pub userprofile: Option<ProfileSection>,
}

impl From<MeResponse> for UserProfile {
    fn from(me: MeResponse) -> Self {
        let profile = me.userprofile.unwrap_or_default();
        let role = profile
            .role
            .or(me.role)
            .filter(|r| !r.trim().is_empty())
            .map(Role::from);
        let division = coerce::safe_text(&profile.division).or_else(|| coerce::safe_text(&me.division));
        let id = match &me.id {
            Value::Null => None,
            other => Some(coerce::safe_number(other) as i64),
        };

        UserProfile {
            id,
            username: me.username.unwrap_or_default(),
            role,
            division,
            full_name: profile.full_name.or(me.full_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from("engineer"), Role::Engineer);
        assert_eq!(Role::from("QAC"), Role::Qac);
        assert_eq!(Role::from("requester"), Role::Other("requester".to_string()));
        assert_eq!(String::from(Role::Utility), "utility");
    }

    #[test]
    fn test_role_serde() {
        let role: Role = serde_json::from_value(json!("admin")).unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_value(Role::Division).unwrap(), json!("division"));
    }

    #[test]
    fn test_me_nested_profile() {
        let me: MeResponse = serde_json::from_value(json!({
            "id": 7,
            "username": "alice",
            "userprofile": {"role": "engineer", "division": "EN", "status": "Active"}
        }))
        .unwrap();
        let user = UserProfile::from(me);
        assert_eq!(user.id, Some(7));
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Some(Role::Engineer));
        assert_eq!(user.division.as_deref(), Some("EN"));
    }

    #[test]
    fn test_me_flat_profile() {
        let me: MeResponse = serde_json::from_value(json!({
            "id": "12",
            "username": "bob",
            "full_name": "Bob Utility",
            "role": "utility",
            "division": ""
        }))
        .unwrap();
        let user = UserProfile::from(me);
        assert_eq!(user.id, Some(12));
        assert_eq!(user.role, Some(Role::Utility));
        assert_eq!(user.full_name.as_deref(), Some("Bob Utility"));
        assert_eq!(user.division, None);
    }

    #[test]
    fn test_me_without_role() {
        let me: MeResponse = serde_json::from_value(json!({"username": "carol"})).unwrap();
        assert_eq!(UserProfile::from(me).role, None);
    }

    #[test]
    fn test_method_body_rule() {
        assert!(ApiMethod::Post.requires_body());
        assert!(ApiMethod::Patch.requires_body());
        assert!(!ApiMethod::Get.requires_body());
        assert!(!ApiMethod::Delete.requires_body());
    }
}
