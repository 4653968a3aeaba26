use async_trait::async_trait;
use serde::Deserialize;

use super::{require_id, ContactGateway, PageQuery};
use crate::client::RestClient;
use crate::contact::{Contact, ContactId, Page};
use crate::error::ClientError;

/// List responses come back either bare or wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContactList {
    Bare(Vec<Contact>),
    Wrapped { contacts: Vec<Contact> },
}

impl From<ContactList> for Vec<Contact> {
    fn from(list: ContactList) -> Self {
        match list {
            ContactList::Bare(contacts) => contacts,
            ContactList::Wrapped { contacts } => contacts,
        }
    }
}

/// Contact operations over the REST API at `/api/{version}/contacts`
#[derive(Clone)]
pub struct HttpContactGateway {
    client: RestClient,
    prefix: String,
}

impl HttpContactGateway {
    pub fn new(client: RestClient, version: &str) -> Self {
        Self {
            client,
            prefix: format!("/api/{}/contacts", version.trim_matches('/')),
        }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    fn item_path(&self, id: &ContactId) -> String {
        format!("{}/{}", self.prefix, id)
    }
}

#[async_trait]
impl ContactGateway for HttpContactGateway {
    async fn list(&self) -> Result<Vec<Contact>, ClientError> {
        let list: ContactList = self.client.get(&self.prefix, &[]).await?;
        let contacts: Vec<Contact> = list.into();
        tracing::debug!("fetched {} contacts", contacts.len());
        Ok(contacts)
    }

    async fn list_paged(&self, query: &PageQuery) -> Result<Page, ClientError> {
        let path = format!("{}/paged", self.prefix);
        let page: Page = self.client.get(&path, &query.to_query_pairs()).await?;
        tracing::debug!(
            "fetched page {} ({} of {} contacts)",
            query.page_number,
            page.data.len(),
            page.total_count
        );
        Ok(page)
    }

    async fn search(&self, query: &str) -> Result<Vec<Contact>, ClientError> {
        let path = format!("{}/search", self.prefix);
        let list: ContactList = self.client.get(&path, &[("query", query.to_string())]).await?;
        Ok(list.into())
    }

    async fn get(&self, id: &ContactId) -> Result<Contact, ClientError> {
        self.client.get(&self.item_path(id), &[]).await
    }

    async fn create(&self, contact: &Contact) -> Result<Contact, ClientError> {
        let created: Contact = self.client.post(&self.prefix, &contact.without_id()).await?;
        tracing::info!(
            "created contact {}",
            created.id.as_ref().map(ToString::to_string).unwrap_or_default()
        );
        Ok(created)
    }

    async fn update(&self, contact: &Contact) -> Result<Contact, ClientError> {
        let id = require_id(contact)?;
        let updated: Contact = self.client.put(&self.item_path(id), contact).await?;
        tracing::info!("updated contact {}", id);
        Ok(updated)
    }

    async fn delete(&self, id: &ContactId) -> Result<(), ClientError> {
        self.client.delete(&self.item_path(id)).await?;
        tracing::info!("deleted contact {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_accepts_bare_and_wrapped_arrays() {
        let bare: ContactList = serde_json::from_value(json!([{ "id": 1, "firstName": "Ann" }])).unwrap();
        let wrapped: ContactList =
            serde_json::from_value(json!({ "contacts": [{ "id": 2, "firstName": "Bea" }] })).unwrap();

        let bare: Vec<Contact> = bare.into();
        let wrapped: Vec<Contact> = wrapped.into();
        assert_eq!(bare[0].first_name, "Ann");
        assert_eq!(wrapped[0].id, Some(ContactId::Number(2)));
    }
}
