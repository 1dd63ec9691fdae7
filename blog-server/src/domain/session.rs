use serde::{Deserialize, Serialize};

/// How the caller proved who they are. Resolved against the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    SessionSecret(String),
    Jwt(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
}
