pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactId, Page};
use crate::error::ClientError;
use crate::sort::{SortDirection, SortField};

pub use http::HttpContactGateway;
pub use memory::MemoryContactGateway;

/// Typed contact operations, independent of transport
#[async_trait]
pub trait ContactGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<Contact>, ClientError>;
    async fn list_paged(&self, query: &PageQuery) -> Result<Page, ClientError>;
    async fn search(&self, query: &str) -> Result<Vec<Contact>, ClientError>;
    async fn get(&self, id: &ContactId) -> Result<Contact, ClientError>;
    async fn create(&self, contact: &Contact) -> Result<Contact, ClientError>;
    /// The contact must carry its id
    async fn update(&self, contact: &Contact) -> Result<Contact, ClientError>;
    async fn delete(&self, id: &ContactId) -> Result<(), ClientError>;
}

/// Parameters of the paged list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub search: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub sort_by: Option<SortField>,
    pub order: SortDirection,
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            search: None,
            name: None,
            city: None,
            state: None,
            sort_by: None,
            order: SortDirection::Asc,
            page_number: 1,
            page_size: 10,
        }
    }
}

impl PageQuery {
    /// Query-string pairs; empty filters are left out entirely
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        let filters = [
            ("search", &self.search),
            ("name", &self.name),
            ("city", &self.city),
            ("state", &self.state),
        ];
        for (key, value) in filters {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }

        if let Some(field) = self.sort_by {
            pairs.push(("sortby", field.as_param().to_string()));
        }
        pairs.push(("order", self.order.as_param().to_string()));
        pairs.push(("pageNumber", self.page_number.max(1).to_string()));
        pairs.push(("pageSize", self.page_size.max(1).to_string()));
        pairs
    }
}

pub(crate) fn require_id(contact: &Contact) -> Result<&ContactId, ClientError> {
    contact
        .id
        .as_ref()
        .ok_or_else(|| ClientError::BadRequest("Contact has no id; create it instead".to_string()))
}
