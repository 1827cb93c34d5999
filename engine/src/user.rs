//! The user resource.

use crate::{error::Result, validate::FieldRule, FieldKind, Resource, Timestamp};
use serde::{Deserialize, Serialize};

/// Access level of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Moderator,
}

/// Account status of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

/// A user as returned by the server.
///
/// Servers that echo the create request back may leave out `role`,
/// `status` and `updatedAt`; those decode as the defaults and the creation
/// time respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "UserWire")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Decoding form of [`User`] with the optional fields servers omit.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWire {
    id: String,
    name: String,
    email: String,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    status: UserStatus,
    created_at: Timestamp,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            email: wire.email,
            avatar: wire.avatar,
            role: wire.role,
            status: wire.status,
            created_at: wire.created_at,
            updated_at: wire.updated_at.unwrap_or(wire.created_at),
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserDraft {
    /// Create a draft with the server's default role.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: None,
        }
    }

    /// Request a specific role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// Partial update of a user. Only present fields are sent and applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

const DRAFT_RULES: [FieldRule; 2] = [
    FieldRule::required("name", FieldKind::Text).with_min_len(2),
    FieldRule::required("email", FieldKind::Email),
];

impl Resource for User {
    type Draft = UserDraft;
    type Patch = UserPatch;

    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = Some(avatar.clone());
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    fn touch(&mut self, at: Timestamp) {
        self.updated_at = at;
    }

    fn validate_draft(draft: &UserDraft) -> Result<()> {
        DRAFT_RULES[0].validate(Some(&draft.name))?;
        DRAFT_RULES[1].validate(Some(&draft.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample() -> User {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        User {
            id: "1".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            avatar: None,
            role: Role::User,
            status: UserStatus::Active,
            created_at: t,
            updated_at: t,
        }
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut user = sample();
        let patch = UserPatch {
            role: Some(Role::Admin),
            status: Some(UserStatus::Inactive),
            ..Default::default()
        };

        user.apply_patch(&patch);

        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.status, UserStatus::Inactive);
    }

    #[test]
    fn patch_omits_absent_fields_on_the_wire() {
        let patch = UserPatch {
            name: Some("Bob".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"name": "Bob"}));
    }

    #[test]
    fn wire_format_is_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["createdAt"], "2024-01-01T12:00:00Z");
        assert_eq!(value["role"], "user");
        assert_eq!(value["status"], "active");
        assert!(value.get("avatar").is_none());
    }

    #[test]
    fn parses_server_payload() {
        let user: User = serde_json::from_value(json!({
            "id": "42",
            "name": "Ana",
            "email": "a@x.com",
            "role": "moderator",
            "status": "pending",
            "createdAt": "2024-03-01T08:30:00.000Z",
            "updatedAt": "2024-03-02T08:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(user.role, Role::Moderator);
        assert_eq!(user.status, UserStatus::Pending);
        assert!(user.avatar.is_none());
    }

    #[test]
    fn create_echo_without_status_or_updated_at() {
        let user: User = serde_json::from_value(json!({
            "id": "42",
            "name": "Ana",
            "email": "a@x.com",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.updated_at, user.created_at);
        assert_eq!(
            user.created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn missing_created_at_is_rejected() {
        let result = serde_json::from_value::<User>(json!({
            "id": "42",
            "name": "Ana",
            "email": "a@x.com"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn draft_validation() {
        assert!(User::validate_draft(&UserDraft::new("Ana", "a@x.com")).is_ok());
        assert!(matches!(
            User::validate_draft(&UserDraft::new("", "a@x.com")),
            Err(crate::Error::MissingRequiredField(_))
        ));
        assert!(matches!(
            User::validate_draft(&UserDraft::new("A", "a@x.com")),
            Err(crate::Error::FieldTooShort { min: 2, .. })
        ));
        assert!(matches!(
            User::validate_draft(&UserDraft::new("Ana", "not-an-email")),
            Err(crate::Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn draft_role_is_optional_on_the_wire() {
        let draft = UserDraft::new("Ana", "a@x.com");
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"name": "Ana", "email": "a@x.com"})
        );
        let draft = draft.with_role(Role::Admin);
        assert_eq!(serde_json::to_value(&draft).unwrap()["role"], "admin");
    }
}
