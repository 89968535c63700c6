//! Wire types for the directory API.
//!
//! Field names follow the server's camelCase JSON; every response body is
//! wrapped in the `{ success, message, data }` envelope handled by
//! [`crate::client::DirectoryClient`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Users & auth ────────────────────────────────────────────────────

/// An account holder. Contacts are owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// `POST /auth/login` / `POST /auth/register` payload: the bearer token
/// plus the authenticated user's profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    /// Token scheme, e.g. `"Bearer"`. Informational only.
    #[serde(default)]
    pub r#type: String,
    pub user: User,
}

// ── Contacts ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailType {
    #[serde(rename = "WORK")]
    Work,
    #[serde(rename = "PERSONAL")]
    Personal,
    #[serde(rename = "OTHER")]
    Other,
}

impl EmailType {
    /// Strict parse of a wire label like `WORK`. Case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "WORK" => Some(Self::Work),
            "PERSONAL" => Some(Self::Personal),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Personal => "PERSONAL",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneType {
    #[serde(rename = "WORK")]
    Work,
    #[serde(rename = "HOME")]
    Home,
    #[serde(rename = "PERSONAL")]
    Personal,
    #[serde(rename = "OTHER")]
    Other,
}

impl PhoneType {
    /// Strict parse of a wire label like `HOME`. Case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "WORK" => Some(Self::Work),
            "HOME" => Some(Self::Home),
            "PERSONAL" => Some(Self::Personal),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Self::Work => "WORK",
            Self::Home => "HOME",
            Self::Personal => "PERSONAL",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEmail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub email: String,
    pub r#type: EmailType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPhone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub phone_number: String,
    pub r#type: PhoneType,
}

/// A contact as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub emails: Vec<ContactEmail>,
    #[serde(default)]
    pub phones: Vec<ContactPhone>,
    pub user_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload. The client requires at least one email and one
/// phone before submission; the server may be stricter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub emails: Vec<ContactEmail>,
    #[serde(default)]
    pub phones: Vec<ContactPhone>,
}

// ── Pagination ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDir {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDir {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Zero-based page request, rendered as query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort_by: Option<String>,
    pub sort_dir: SortDir,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            sort_by: None,
            sort_dir: SortDir::Asc,
        }
    }
}

impl PageRequest {
    /// Render as `page` / `size` / `sortBy` / `sortDir` query parameters.
    pub(crate) fn as_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ];
        if let Some(ref sort_by) = self.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }
        params.push(("sortDir", self.sort_dir.as_param().to_owned()));
        params
    }
}

/// One page of results, Spring-style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

// ── Import / export ─────────────────────────────────────────────────

/// File formats the import/export endpoints understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFormat {
    Json,
    Csv,
}

impl TransferFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

// ── Envelope ────────────────────────────────────────────────────────

/// The `{ success, message, data }` wrapper around every JSON response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Error body shape: `{ success: false, message, errors? }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<std::collections::BTreeMap<String, String>>,
}
