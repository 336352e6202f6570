use serde::{Deserialize, Serialize};

/// A stored credential. The secret is held as an opaque ciphertext envelope;
/// nothing above the cipher adapter ever parses or compares it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub username: String,
    pub secret_ciphertext: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<Tag>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A user-owned label attached to credentials. Names are unique per owner,
/// not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub owner_id: String,
    pub name: String,
}

/// Input for creating a credential. `secret` is plaintext here; it is
/// encrypted before anything touches persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCredential {
    pub name: String,
    pub username: String,
    pub secret: String,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// Partial update with PATCH semantics: `None` leaves a field untouched,
/// `Some` replaces it. `tag_ids: Some(vec![])` clears the tag set, while
/// `tag_ids: None` keeps it as-is; the two are distinct states.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// What the service hands back to callers. `secret` is decrypted plaintext
/// only on a single fetch; list and write paths carry the fixed mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: String,
    pub name: String,
    pub username: String,
    pub secret: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<Tag>,
    pub created_at: i64,
    pub updated_at: i64,
}
