use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::sync::RwLock;

use super::{require_id, ContactGateway, PageQuery};
use crate::contact::{Contact, ContactId, Page};
use crate::error::ClientError;
use crate::sort::{SortField, SortKey};
use crate::validation::validate_form;

/// A gateway call as recorded by [`MemoryContactGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    List,
    ListPaged(PageQuery),
    Search(String),
    Get(ContactId),
    Create,
    Update(ContactId),
    Delete(ContactId),
}

struct Store {
    records: BTreeMap<i64, Contact>,
    next_id: i64,
}

/// Contact store held in memory. Validates writes with the form engine, can
/// keep a log of every call and can be told to fail the next one.
pub struct MemoryContactGateway {
    store: RwLock<Store>,
    recording: bool,
    calls: Mutex<Vec<GatewayCall>>,
    fail_next: Mutex<Option<ClientError>>,
}

impl Default for MemoryContactGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContactGateway {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                records: BTreeMap::new(),
                next_id: 1,
            }),
            recording: false,
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Seed with records; each gets the next free id regardless of what it carries
    pub fn with_contacts(contacts: impl IntoIterator<Item = Contact>) -> Self {
        let mut store = Store {
            records: BTreeMap::new(),
            next_id: 1,
        };
        for contact in contacts {
            store.insert(contact);
        }
        Self {
            store: RwLock::new(store),
            ..Self::new()
        }
    }

    /// Log every call from now on. Off by default so a long-running backend
    /// does not accumulate a history.
    pub fn recording_calls(mut self) -> Self {
        self.recording = true;
        self
    }

    /// Every call made so far, oldest first. Empty unless recording.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    /// The next call, whatever it is, fails with `err`
    pub fn fail_next(&self, err: ClientError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(err);
        }
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn record(&self, call: GatewayCall) -> Result<(), ClientError> {
        tracing::debug!("memory gateway: {:?}", call);
        if self.recording {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }
        match self.fail_next.lock().ok().and_then(|mut slot| slot.take()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Store {
    fn insert(&mut self, contact: Contact) -> Contact {
        let id = self.next_id;
        self.next_id += 1;
        let stored = Contact {
            id: Some(ContactId::Number(id)),
            ..contact
        };
        self.records.insert(id, stored.clone());
        stored
    }

    fn get(&self, id: &ContactId) -> Result<&Contact, ClientError> {
        id.as_number()
            .and_then(|key| self.records.get(&key))
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: &ContactId) -> ClientError {
    ClientError::NotFound(format!("Contact {} not found", id))
}

fn check(contact: &Contact) -> Result<(), ClientError> {
    let errors = validate_form(contact);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ClientError::validation(errors))
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Free-text match over names, email, phone and city
fn matches_text(contact: &Contact, text: &str) -> bool {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return true;
    }
    [
        contact.full_name().as_str(),
        contact.email.as_str(),
        contact.phone_number.as_str(),
        contact.city.as_str(),
    ]
    .iter()
    .any(|value| contains_ci(value, &text))
}

fn matches_filter(value: &str, filter: Option<&String>) -> bool {
    match filter.map(|f| f.trim().to_lowercase()) {
        Some(f) if !f.is_empty() => contains_ci(value, &f),
        _ => true,
    }
}

fn matches_query(contact: &Contact, query: &PageQuery) -> bool {
    query.search.as_deref().map_or(true, |s| matches_text(contact, s))
        && matches_filter(&contact.full_name(), query.name.as_ref())
        && matches_filter(&contact.city, query.city.as_ref())
        && matches_filter(&contact.state, query.state.as_ref())
}

#[async_trait]
impl ContactGateway for MemoryContactGateway {
    async fn list(&self) -> Result<Vec<Contact>, ClientError> {
        self.record(GatewayCall::List)?;
        Ok(self.store.read().await.records.values().cloned().collect())
    }

    async fn list_paged(&self, query: &PageQuery) -> Result<Page, ClientError> {
        self.record(GatewayCall::ListPaged(query.clone()))?;
        let store = self.store.read().await;

        let mut matching: Vec<&Contact> = store
            .records
            .values()
            .filter(|c| matches_query(c, query))
            .collect();
        let key = SortKey::new(query.sort_by.unwrap_or(SortField::Id), query.order);
        matching.sort_by(|a, b| key.compare(a, b));

        let page_size = query.page_size.max(1) as usize;
        let skip = (query.page_number.max(1) as usize - 1) * page_size;
        Ok(Page {
            total_count: matching.len() as u64,
            data: matching.into_iter().skip(skip).take(page_size).cloned().collect(),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<Contact>, ClientError> {
        self.record(GatewayCall::Search(query.to_string()))?;
        let store = self.store.read().await;
        Ok(store
            .records
            .values()
            .filter(|c| matches_text(c, query))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &ContactId) -> Result<Contact, ClientError> {
        self.record(GatewayCall::Get(id.clone()))?;
        self.store.read().await.get(id).cloned()
    }

    async fn create(&self, contact: &Contact) -> Result<Contact, ClientError> {
        self.record(GatewayCall::Create)?;
        check(contact)?;
        let created = self.store.write().await.insert(contact.without_id());
        tracing::debug!("memory gateway: stored {:?}", created.id);
        Ok(created)
    }

    async fn update(&self, contact: &Contact) -> Result<Contact, ClientError> {
        let id = require_id(contact)?;
        self.record(GatewayCall::Update(id.clone()))?;
        check(contact)?;

        let mut store = self.store.write().await;
        let key = id.as_number().ok_or_else(|| not_found(id))?;
        let slot = store.records.get_mut(&key).ok_or_else(|| not_found(id))?;
        *slot = Contact {
            id: Some(ContactId::Number(key)),
            ..contact.clone()
        };
        Ok(slot.clone())
    }

    async fn delete(&self, id: &ContactId) -> Result<(), ClientError> {
        self.record(GatewayCall::Delete(id.clone()))?;
        let mut store = self.store.write().await;
        let key = id.as_number().ok_or_else(|| not_found(id))?;
        store.records.remove(&key).map(|_| ()).ok_or_else(|| not_found(id))
    }
}
