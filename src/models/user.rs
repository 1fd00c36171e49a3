use serde::{Deserialize, Serialize};

/// Console roles as issued by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "SUPERVISOR")]
    Supervisor,
    #[serde(rename = "CALLCENTER")]
    Callcenter,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Supervisor => write!(f, "SUPERVISOR"),
            Role::Callcenter => write!(f, "CALLCENTER"),
        }
    }
}

/// User profile as returned by `POST /auth/login` (embedded) and `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "canAccessIvrs")]
    pub can_access_ivrs: bool,
    #[serde(rename = "canAccessWhatsapp")]
    pub can_access_whatsapp: bool,
}
