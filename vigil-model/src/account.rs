use chrono::{DateTime, Utc};

use crate::ids::UserId;

/// A stored user account. The password hash never leaves the backend.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub password_hash: String,
    pub company_id: String,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            company_id: self.company_id.clone(),
            company_name: self.company_name.clone(),
        }
    }
}

/// The public shape of an account, safe to return to the frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub company_id: String,
    pub company_name: String,
}

/// Company profile driving the regulatory-watch analysis questions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanySettings {
    pub company_id: String,
    pub user_id: Option<UserId>,
    pub sector: String,
    pub tax_regime: String,
    pub legal_form: String,
    pub updated_at: DateTime<Utc>,
}
