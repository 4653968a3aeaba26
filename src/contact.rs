//! Contact records as they travel between the client and the REST backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identity. Backends hand out either numbers or strings,
/// so both are accepted and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContactId {
    Number(i64),
    Text(String),
}

impl ContactId {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            ContactId::Number(n) => Some(*n),
            ContactId::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactId::Number(n) => write!(f, "{}", n),
            ContactId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ContactId {
    fn from(n: i64) -> Self {
        ContactId::Number(n)
    }
}

impl From<&str> for ContactId {
    fn from(s: &str) -> Self {
        // Numeric text is normalized so "7" and 7 name the same record
        match s.parse::<i64>() {
            Ok(n) => ContactId::Number(n),
            Err(_) => ContactId::Text(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactId>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

impl Contact {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// The record as sent on create: everything except the identity
    pub fn without_id(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }
}

/// One page from the paged list endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub data: Vec<Contact>,
    #[serde(default)]
    pub total_count: u64,
}

impl Page {
    /// Number of pages for the given page size, never less than one
    pub fn total_pages(&self, page_size: u32) -> u32 {
        total_pages(self.total_count, page_size)
    }
}

pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 || total_count == 0 {
        return 1;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
