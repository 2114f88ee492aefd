use serde::{Deserialize, Serialize};
use crate::server::model::UserId;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The authenticated user a submission is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Identity {
    pub user_id: UserId,
    pub username: String,
}

/// Credential row as stored; the password itself is never persisted.
#[derive(Debug, Clone)]
pub(crate) struct StoredCredential {
    pub user_id: UserId,
    pub username: String,
    pub salt: Vec<u8>,
    pub hash: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AuthOutcome {
    Accepted(Identity),
    Rejected,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub success: bool,
    pub user_id: UserId,
    pub username: String,
}

impl From<Identity> for LoginResponse {
    fn from(Identity { user_id, username }: Identity) -> Self {
        Self {
            success: true,
            user_id,
            username,
        }
    }
}
