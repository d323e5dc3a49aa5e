use serde::{Deserialize, Serialize};

/// Comment, page and user identifiers are opaque strings chosen by the
/// storage backend or the auth provider.
pub type CommentId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identity of the signed-in user, derived from the auth session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Public profile of a comment author or a mention candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<AuthInfo> for UserProfile {
    fn from(auth: AuthInfo) -> Self {
        Self {
            id: auth.id,
            name: auth.name,
            image: auth.image,
        }
    }
}
