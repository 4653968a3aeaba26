//! List screen controller.
//!
//! Owns the contact collection and every piece of transient view state
//! (selection, sort, paging, form, detail modal, delete confirmation,
//! messages) and drives the gateway one call at a time. Failures never leave
//! the controller loading; an authentication failure ends the session and
//! parks the controller in [`ViewState::RedirectToLogin`].

pub mod state;

use rand::Rng;
use std::sync::Arc;

use crate::auth::SessionStore;
use crate::config::ListMode;
use crate::contact::{Contact, ContactId, Page};
use crate::error::{ClientError, ErrorKind};
use crate::gateway::{ContactGateway, PageQuery};
use crate::sort::{sorted, SortDirection, SortField, SortKey};
use crate::validation::{ContactForm, FormMode};

pub use state::{
    ControllerSettings, FetchTicket, ListFilters, Message, MessageKind, Pagination, ViewState,
};
use state::non_empty;

pub struct ContactListController<G: ContactGateway + ?Sized> {
    gateway: Arc<G>,
    session: Arc<SessionStore>,
    settings: ControllerSettings,
    state: ViewState,
    contacts: Vec<Contact>,
    selected: Option<ContactId>,
    sort_field: Option<SortField>,
    sort_direction: SortDirection,
    loading: bool,
    error: Option<String>,
    message: Option<Message>,
    form: Option<ContactForm>,
    detail: Option<Contact>,
    pagination: Pagination,
    filters: ListFilters,
    generation: u64,
}

impl<G: ContactGateway + ?Sized> ContactListController<G> {
    pub fn new(gateway: Arc<G>, session: Arc<SessionStore>, settings: ControllerSettings) -> Self {
        let pagination = Pagination::new(settings.page_size);
        Self {
            gateway,
            session,
            settings,
            state: ViewState::List,
            contacts: Vec::new(),
            selected: None,
            sort_field: None,
            sort_direction: SortDirection::Asc,
            loading: false,
            error: None,
            message: None,
            form: None,
            detail: None,
            pagination,
            filters: ListFilters::default(),
            generation: 0,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Contacts in server order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_id(&self) -> Option<&ContactId> {
        self.selected.as_ref()
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        let id = self.selected.as_ref()?;
        self.contacts.iter().find(|c| c.id.as_ref() == Some(id))
    }

    pub fn form(&self) -> Option<&ContactForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut ContactForm> {
        self.form.as_mut()
    }

    pub fn detail(&self) -> Option<&Contact> {
        self.detail.as_ref()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn filters(&self) -> &ListFilters {
        &self.filters
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn is_redirected(&self) -> bool {
        self.state == ViewState::RedirectToLogin
    }

    // ---- Loading ----

    /// First load of the screen. Without a valid session the controller
    /// goes straight to the login redirect.
    pub async fn mount(&mut self) {
        if self.is_redirected() {
            return;
        }
        if !self.session.is_authenticated().await {
            tracing::info!("no valid session, redirecting to login");
            self.redirect_to_login();
            return;
        }
        self.fetch().await;
    }

    /// Refetch and return to a plain list: form, detail and selection are dropped
    pub async fn refresh(&mut self) {
        if self.is_redirected() {
            return;
        }
        self.form = None;
        self.detail = None;
        self.selected = None;
        self.fetch().await;
    }

    /// Start a list fetch. The returned ticket must accompany the result to
    /// [`apply_fetch`](Self::apply_fetch); starting another fetch makes it stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.state = ViewState::Loading;
        FetchTicket(self.generation)
    }

    /// Land a fetch result. Returns false when the result was discarded
    /// because a newer fetch has started since.
    pub async fn apply_fetch(&mut self, ticket: FetchTicket, result: Result<Page, ClientError>) -> bool {
        if self.is_redirected() {
            return false;
        }
        if ticket.0 != self.generation {
            tracing::debug!("discarding stale list response {} (latest {})", ticket.0, self.generation);
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.pagination.total_count = page.total_count;
                self.contacts = page.data;
                if self.selected_contact().is_none() {
                    self.selected = None;
                }
                self.state = ViewState::List;
            }
            Err(err) => {
                self.contacts.clear();
                self.pagination.total_count = 0;
                if self.handle_auth(&err).await {
                    return true;
                }
                tracing::warn!("failed to load contacts: {}", err);
                self.error = Some(err.user_message());
                self.state = ViewState::Error;
            }
        }
        true
    }

    async fn fetch(&mut self) {
        let ticket = self.begin_fetch();
        let result = self.fetch_page().await;
        self.apply_fetch(ticket, result).await;

        // A delete can empty the last page; land on the new last one
        if self.settings.list_mode == ListMode::Paged
            && self.state == ViewState::List
            && self.pagination.page > self.pagination.total_pages()
        {
            self.pagination.page = self.pagination.total_pages();
            tracing::debug!("page out of range, moving to page {}", self.pagination.page);
            let ticket = self.begin_fetch();
            let result = self.fetch_page().await;
            self.apply_fetch(ticket, result).await;
        }
    }

    async fn fetch_page(&self) -> Result<Page, ClientError> {
        match self.settings.list_mode {
            ListMode::Paged => self.gateway.list_paged(&self.page_query()).await,
            ListMode::All => {
                let contacts = match self.filters.search.as_deref() {
                    Some(text) => self.gateway.search(text).await?,
                    None => self.gateway.list().await?,
                };
                Ok(Page {
                    total_count: contacts.len() as u64,
                    data: contacts,
                })
            }
        }
    }

    fn page_query(&self) -> PageQuery {
        PageQuery {
            search: self.filters.search.clone(),
            name: self.filters.name.clone(),
            city: self.filters.city.clone(),
            state: self.filters.state.clone(),
            sort_by: self.sort_field,
            order: self.sort_direction,
            page_number: self.pagination.page,
            page_size: self.pagination.page_size,
        }
    }

    // ---- Create / update ----

    pub fn open_create(&mut self) {
        if self.is_redirected() {
            return;
        }
        self.form = Some(ContactForm::new());
        self.state = ViewState::FormOpen(FormMode::Create);
    }

    /// Open the edit form for the selected contact, freshly fetched
    pub async fn open_update(&mut self) {
        if self.is_redirected() {
            return;
        }
        let Some(id) = self.selected.clone() else {
            self.post(MessageKind::Warning, "Please select a contact to update");
            self.state = ViewState::List;
            return;
        };

        self.loading = true;
        let result = self.gateway.get(&id).await;
        self.loading = false;

        match result {
            Ok(contact) => {
                let form = ContactForm::for_contact(contact);
                self.state = ViewState::FormOpen(form.mode());
                self.form = Some(form);
            }
            Err(err) => self.report(err, ViewState::List).await,
        }
    }

    pub fn fill_sample_data<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(form) = self.form.as_mut() {
            form.fill_sample_data(rng);
        }
    }

    /// Validate the open form and, if clean, create or update the record.
    /// Returns the saved contact on success.
    pub async fn submit_form(&mut self) -> Option<Contact> {
        if self.is_redirected() {
            return None;
        }
        let form = self.form.as_mut()?;
        let mode = form.mode();
        let contact = match form.prepare_submit() {
            Ok(contact) => contact,
            Err(errors) => {
                tracing::debug!("form rejected with {} invalid fields", errors.len());
                return None;
            }
        };

        self.loading = true;
        let result = match mode {
            FormMode::Edit => self.gateway.update(&contact).await,
            FormMode::Create => self.gateway.create(&contact).await,
        };
        self.loading = false;

        match result {
            Ok(saved) => {
                self.form = None;
                let text = match mode {
                    FormMode::Edit => "Contact updated successfully",
                    FormMode::Create => "Contact created successfully",
                };
                self.post(MessageKind::Success, text);
                self.fetch().await;
                Some(saved)
            }
            Err(err) => {
                if let (Some(errors), Some(form)) = (err.field_errors(), self.form.as_mut()) {
                    form.set_errors(errors.clone());
                }
                self.report(err, ViewState::FormOpen(mode)).await;
                None
            }
        }
    }

    pub fn cancel_form(&mut self) {
        if self.is_redirected() {
            return;
        }
        self.form = None;
        self.state = ViewState::List;
    }

    // ---- Delete ----

    /// Ask for confirmation before deleting the selected contact
    pub fn request_delete(&mut self) {
        if self.is_redirected() {
            return;
        }
        if self.selected.is_none() {
            self.post(MessageKind::Warning, "Please select a contact to delete");
            self.state = ViewState::List;
            return;
        }
        self.state = ViewState::DeleteConfirmOpen;
    }

    pub async fn confirm_delete(&mut self) -> bool {
        if self.state != ViewState::DeleteConfirmOpen {
            return false;
        }
        let Some(id) = self.selected.clone() else {
            self.state = ViewState::List;
            return false;
        };

        self.loading = true;
        let result = self.gateway.delete(&id).await;
        self.loading = false;

        match result {
            Ok(()) => {
                tracing::info!("deleted contact {}", id);
                self.selected = None;
                self.post(MessageKind::Success, "Contact deleted successfully");
                self.fetch().await;
                true
            }
            Err(err) => {
                self.report(err, ViewState::List).await;
                false
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        if self.state == ViewState::DeleteConfirmOpen {
            self.state = ViewState::List;
        }
    }

    // ---- Selection / detail ----

    /// Select `id`, or clear the selection if it is already selected
    pub fn toggle_selection(&mut self, id: ContactId) {
        if self.is_redirected() {
            return;
        }
        if self.selected.as_ref() == Some(&id) {
            self.selected = None;
        } else {
            self.selected = Some(id);
        }
    }

    /// Fetch the full record and show it in the detail modal
    pub async fn view_contact(&mut self, id: ContactId) {
        if self.is_redirected() {
            return;
        }
        self.loading = true;
        let result = self.gateway.get(&id).await;
        self.loading = false;

        match result {
            Ok(contact) => {
                self.detail = Some(contact);
                self.state = ViewState::DetailModalOpen;
            }
            Err(err) => self.report(err, ViewState::List).await,
        }
    }

    pub fn close_detail(&mut self) {
        if self.is_redirected() {
            return;
        }
        self.detail = None;
        self.state = ViewState::List;
    }

    // ---- Sorting ----

    pub fn sort(&self) -> Option<SortKey> {
        self.sort_field.map(|field| SortKey::new(field, self.sort_direction))
    }

    pub async fn set_sort_field(&mut self, field: SortField) {
        let key = SortKey::new(field, self.sort_direction);
        self.set_sort(Some(key)).await;
    }

    pub async fn toggle_sort_direction(&mut self) {
        if self.is_redirected() {
            return;
        }
        self.sort_direction = self.sort_direction.toggled();
        self.resort().await;
    }

    pub async fn set_sort(&mut self, sort: Option<SortKey>) {
        if self.is_redirected() {
            return;
        }
        self.sort_field = sort.map(|s| s.field);
        if let Some(key) = sort {
            self.sort_direction = key.direction;
        }
        self.resort().await;
    }

    // The full list sorts locally; a paged list is sorted by the server
    async fn resort(&mut self) {
        if self.settings.list_mode == ListMode::Paged {
            self.fetch().await;
        }
    }

    /// The collection ordered by the current sort. Server order when unsorted
    /// and always in paged mode, where the server applies the sort.
    pub fn sorted_contacts(&self) -> Vec<&Contact> {
        match self.sort() {
            Some(key) if self.settings.list_mode == ListMode::All => sorted(&self.contacts, &key),
            _ => self.contacts.iter().collect(),
        }
    }

    // ---- Search / paging ----

    /// Free-text search; blank text clears it. Returns to the first page.
    pub async fn set_search(&mut self, text: &str) {
        if self.is_redirected() {
            return;
        }
        self.filters.search = non_empty(Some(text));
        self.pagination.page = 1;
        self.fetch().await;
    }

    pub async fn set_filters(&mut self, name: Option<&str>, city: Option<&str>, state: Option<&str>) {
        if self.is_redirected() {
            return;
        }
        self.filters.name = non_empty(name);
        self.filters.city = non_empty(city);
        self.filters.state = non_empty(state);
        self.pagination.page = 1;
        self.fetch().await;
    }

    /// Move to `page`, clamped to the known page range. Only the paged list
    /// mode has pages; returns false otherwise.
    pub async fn go_to_page(&mut self, page: u32) -> bool {
        if self.is_redirected() {
            return false;
        }
        if self.settings.list_mode != ListMode::Paged {
            tracing::debug!("paging ignored in full-list mode");
            return false;
        }
        self.pagination.page = self.pagination.clamp(page);
        self.fetch().await;
        true
    }

    pub async fn next_page(&mut self) -> bool {
        if !self.pagination.has_next() {
            return false;
        }
        self.go_to_page(self.pagination.page + 1).await
    }

    pub async fn previous_page(&mut self) -> bool {
        if !self.pagination.has_previous() {
            return false;
        }
        self.go_to_page(self.pagination.page - 1).await
    }

    // ---- Session ----

    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.redirect_to_login();
    }

    // ---- Messages ----

    /// The posted message, unless its display time has run out
    pub fn current_message(&self) -> Option<&Message> {
        self.message
            .as_ref()
            .filter(|m| !m.is_expired(self.settings.message_ttl))
    }

    /// Drop the message once its time is up. Returns true if one was removed.
    pub fn expire_message(&mut self) -> bool {
        let expired = self
            .message
            .as_ref()
            .is_some_and(|m| m.is_expired(self.settings.message_ttl));
        if expired {
            self.message = None;
        }
        expired
    }

    fn post(&mut self, kind: MessageKind, text: &str) {
        self.message = Some(Message::new(kind, text));
    }

    // ---- Failures ----

    async fn report(&mut self, err: ClientError, fallback: ViewState) {
        if self.handle_auth(&err).await {
            return;
        }
        tracing::warn!("{} failed: {}", err.error_code(), err);
        self.post(MessageKind::Error, &err.user_message());
        self.state = fallback;
    }

    async fn handle_auth(&mut self, err: &ClientError) -> bool {
        if err.kind() != ErrorKind::Auth {
            return false;
        }
        tracing::info!("{}; redirecting to login", err);
        self.session.logout().await;
        self.redirect_to_login();
        true
    }

    fn redirect_to_login(&mut self) {
        self.loading = false;
        self.contacts.clear();
        self.selected = None;
        self.form = None;
        self.detail = None;
        self.state = ViewState::RedirectToLogin;
    }
}
