use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::str::FromStr;

use crate::ids::{DeclarationId, UserId};

/// Kind of administrative filing tracked by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DeclarationKind {
    Vat,
    SocialSecurity,
    SocialCharges,
    AidRequest,
    AnnualAccounts,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Vat => "vat",
            DeclarationKind::SocialSecurity => "social_security",
            DeclarationKind::SocialCharges => "social_charges",
            DeclarationKind::AidRequest => "aid_request",
            DeclarationKind::AnnualAccounts => "annual_accounts",
        }
    }

    /// Frontend grouping for the procedures board.
    pub fn category(&self) -> ProcedureCategory {
        match self {
            DeclarationKind::Vat => ProcedureCategory::Fiscal,
            DeclarationKind::SocialSecurity | DeclarationKind::SocialCharges => {
                ProcedureCategory::Social
            }
            DeclarationKind::AidRequest => ProcedureCategory::Legal,
            DeclarationKind::AnnualAccounts => ProcedureCategory::Accounting,
        }
    }

    /// Step count assumed when a record does not carry one.
    pub fn default_total_steps(&self) -> i32 {
        match self {
            DeclarationKind::Vat => 1,
            DeclarationKind::SocialSecurity => 3,
            DeclarationKind::AidRequest => 4,
            _ => 5,
        }
    }

    /// Days after the end of the filing period before the deadline.
    pub fn deadline_slack_days(&self) -> u32 {
        match self {
            DeclarationKind::Vat => 20,
            DeclarationKind::SocialSecurity | DeclarationKind::SocialCharges => 15,
            DeclarationKind::AidRequest => 30,
            DeclarationKind::AnnualAccounts => 90,
        }
    }

    pub fn display_name(&self, period: &str) -> String {
        match self {
            DeclarationKind::Vat => format!("VAT return {period}"),
            DeclarationKind::SocialSecurity => {
                format!("Social security filing {period}")
            }
            DeclarationKind::SocialCharges => format!("Social charges {period}"),
            DeclarationKind::AidRequest => format!("Aid request {period}"),
            DeclarationKind::AnnualAccounts => {
                format!("Annual accounts {period}")
            }
        }
    }
}

impl FromStr for DeclarationKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "vat" => Ok(DeclarationKind::Vat),
            "social_security" => Ok(DeclarationKind::SocialSecurity),
            "social_charges" => Ok(DeclarationKind::SocialCharges),
            "aid_request" => Ok(DeclarationKind::AidRequest),
            "annual_accounts" => Ok(DeclarationKind::AnnualAccounts),
            other => Err(format!("unknown declaration kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DeclarationStatus {
    Draft,
    InProgress,
    UnderReview,
    Completed,
    Submitted,
    Error,
}

impl DeclarationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationStatus::Draft => "draft",
            DeclarationStatus::InProgress => "in_progress",
            DeclarationStatus::UnderReview => "under_review",
            DeclarationStatus::Completed => "completed",
            DeclarationStatus::Submitted => "submitted",
            DeclarationStatus::Error => "error",
        }
    }

    /// Collapse the store lifecycle onto the three-column frontend board.
    pub fn board_column(&self) -> ProcedureStatus {
        match self {
            DeclarationStatus::Draft | DeclarationStatus::Error => {
                ProcedureStatus::Todo
            }
            DeclarationStatus::InProgress | DeclarationStatus::UnderReview => {
                ProcedureStatus::InProgress
            }
            DeclarationStatus::Completed | DeclarationStatus::Submitted => {
                ProcedureStatus::Done
            }
        }
    }
}

impl FromStr for DeclarationStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "draft" => Ok(DeclarationStatus::Draft),
            "in_progress" => Ok(DeclarationStatus::InProgress),
            "under_review" => Ok(DeclarationStatus::UnderReview),
            "completed" => Ok(DeclarationStatus::Completed),
            "submitted" => Ok(DeclarationStatus::Submitted),
            "error" => Ok(DeclarationStatus::Error),
            other => Err(format!("unknown declaration status: {other}")),
        }
    }
}

/// Status vocabulary understood by the frontend board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ProcedureStatus {
    Todo,
    #[cfg_attr(feature = "serde", serde(rename = "inprogress"))]
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcedureCategory {
    Fiscal,
    Social,
    Legal,
    Accounting,
}

/// A declaration as persisted in the document store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclarationRecord {
    pub id: DeclarationId,
    pub user_id: UserId,
    pub company_id: String,
    pub kind: DeclarationKind,
    pub status: DeclarationStatus,
    pub current_step: i32,
    pub total_steps: i32,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeclarationRecord {
    /// Filing period recorded during the data step, e.g. `2025-10`.
    pub fn period(&self) -> Option<&str> {
        self.data.get("period").and_then(Value::as_str)
    }

    pub fn progress_percent(&self) -> i32 {
        if self.total_steps <= 0 {
            return 0;
        }
        ((self.current_step as f64 / self.total_steps as f64) * 100.0) as i32
    }
}

/// Frontend projection of a declaration for the procedures board.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcedureView {
    pub id: DeclarationId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub category: ProcedureCategory,
    pub deadline: Option<NaiveDate>,
    pub status: ProcedureStatus,
    pub progress: i32,
    pub current_step: i32,
    pub total_steps: i32,
    pub period: Option<String>,
    pub updated_at: DateTime<Utc>,
}
