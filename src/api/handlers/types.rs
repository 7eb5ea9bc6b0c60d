use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::{CredentialRecord, Role};

/// Body of `register` and `login`.
#[derive(ToSchema, Deserialize, Default)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl From<&CredentialRecord> for UserResponse {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            id: record.identifier.to_string(),
            email: record.email.clone(),
            role: record.role,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MeResponse {
    pub user: Option<UserResponse>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}
