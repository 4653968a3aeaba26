use rand::Rng;
use std::collections::BTreeSet;

use super::normalize::normalize_input;
use super::sample::sample_contact;
use super::{validate_field, validate_form, Field, FieldErrors};
use crate::contact::Contact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// The handler ran and produced this value
    Submitted(T),
    /// Validation failed; the handler was not called
    Rejected(FieldErrors),
}

/// Editable contact plus per-field error and touched state.
///
/// Errors are tracked for every field but only shown for touched ones, so a
/// fresh create form does not open covered in "required" messages.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    contact: Contact,
    touched: BTreeSet<Field>,
    errors: FieldErrors,
}

impl ContactForm {
    /// Empty form for a new record
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from an existing record
    pub fn for_contact(contact: Contact) -> Self {
        Self {
            contact,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> FormMode {
        if self.contact.is_persisted() {
            FormMode::Edit
        } else {
            FormMode::Create
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode() {
            FormMode::Create => "Create Contact",
            FormMode::Edit => "Edit Contact",
        }
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    pub fn value(&self, field: Field) -> &str {
        field.value_of(&self.contact)
    }

    /// Store user input after the field's entry normalization. A field that
    /// was already touched is re-validated right away.
    pub fn set_field(&mut self, field: Field, input: &str) {
        let value = normalize_input(field, input);
        field.set_on(&mut self.contact, value);
        if self.touched.contains(&field) {
            self.revalidate(field);
        }
    }

    /// Mark a field as visited (blur) and validate it
    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
        self.revalidate(field);
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    /// Error for a field if it should be shown
    pub fn error(&self, field: Field) -> Option<&str> {
        if !self.touched.contains(&field) {
            return None;
        }
        self.errors.get(&field).map(String::as_str)
    }

    pub fn visible_errors(&self) -> FieldErrors {
        self.errors
            .iter()
            .filter(|(field, _)| self.touched.contains(*field))
            .map(|(field, msg)| (*field, msg.clone()))
            .collect()
    }

    /// Replace every field with generated data. The identity is kept, so an
    /// edit form stays an edit form.
    pub fn fill_sample_data<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let id = self.contact.id.take();
        self.contact = Contact {
            id,
            ..sample_contact(rng)
        };
        self.errors.clear();
    }

    /// Touch every field and run whole-form validation. Returns the record
    /// ready to send, or the errors that block it.
    pub fn prepare_submit(&mut self) -> Result<Contact, FieldErrors> {
        self.touched.extend(Field::ALL);
        self.errors = validate_form(&self.contact);
        if self.errors.is_empty() {
            Ok(self.contact.clone())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Validate and hand the record to `handler` only when it is clean
    pub fn submit<T, F>(&mut self, handler: F) -> SubmitOutcome<T>
    where
        F: FnOnce(Contact) -> T,
    {
        match self.prepare_submit() {
            Ok(contact) => SubmitOutcome::Submitted(handler(contact)),
            Err(errors) => SubmitOutcome::Rejected(errors),
        }
    }

    /// Attach errors reported for this record from elsewhere (e.g. the server)
    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.touched.extend(errors.keys().copied());
        self.errors = errors;
    }

    fn revalidate(&mut self, field: Field) {
        let error = validate_field(field, field.value_of(&self.contact));
        if error.is_empty() {
            self.errors.remove(&field);
        } else {
            self.errors.insert(field, error);
        }
    }
}
