//! Client-side contact validation.
//!
//! Every rule returns an empty string for a valid value or the message shown
//! next to the field. [`validate_form`] runs the required fields and collects
//! the failures; an empty map means the record can be submitted.

pub mod form;
pub mod normalize;
pub mod sample;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::contact::Contact;

pub use form::{ContactForm, FormMode, SubmitOutcome};
pub use normalize::{format_phone, normalize_state};
pub use sample::sample_contact;

pub type FieldErrors = BTreeMap<Field, String>;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s'-]+$").unwrap());
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").unwrap());
static STATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());
static ZIP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").unwrap());

/// Minimum trimmed length for first and last names
pub const NAME_MIN_LEN: usize = 2;

/// Form fields in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    Address,
    City,
    State,
    ZipCode,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::PhoneNumber,
        Field::Address,
        Field::City,
        Field::State,
        Field::ZipCode,
    ];

    /// Wire name, matching the JSON field of [`Contact`]
    pub fn name(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::PhoneNumber => "phoneNumber",
            Field::Address => "address",
            Field::City => "city",
            Field::State => "state",
            Field::ZipCode => "zipCode",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::Email => "Email",
            Field::PhoneNumber => "Phone Number",
            Field::Address => "Address",
            Field::City => "City",
            Field::State => "State",
            Field::ZipCode => "ZIP Code",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Field::Address)
    }

    pub fn parse(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn value_of<'a>(&self, contact: &'a Contact) -> &'a str {
        match self {
            Field::FirstName => &contact.first_name,
            Field::LastName => &contact.last_name,
            Field::Email => &contact.email,
            Field::PhoneNumber => &contact.phone_number,
            Field::Address => contact.address.as_deref().unwrap_or(""),
            Field::City => &contact.city,
            Field::State => &contact.state,
            Field::ZipCode => &contact.zip_code,
        }
    }

    pub fn set_on(&self, contact: &mut Contact, value: String) {
        match self {
            Field::FirstName => contact.first_name = value,
            Field::LastName => contact.last_name = value,
            Field::Email => contact.email = value,
            Field::PhoneNumber => contact.phone_number = value,
            Field::Address => {
                contact.address = if value.trim().is_empty() { None } else { Some(value) };
            }
            Field::City => contact.city = value,
            Field::State => contact.state = value,
            Field::ZipCode => contact.zip_code = value,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Validate one field. Returns an empty string when the value is acceptable.
pub fn validate_field(field: Field, value: &str) -> String {
    let result = match field {
        Field::FirstName => validate_name("First name", value),
        Field::LastName => validate_name("Last name", value),
        Field::Email => validate_pattern(
            value,
            &EMAIL_PATTERN,
            "Email is required",
            "Please enter a valid email address (example@domain.com)",
        ),
        Field::PhoneNumber => validate_pattern(
            value,
            &PHONE_PATTERN,
            "Phone number is required",
            "Please use format: 555-123-4567",
        ),
        Field::Address => None,
        Field::City => validate_pattern(
            value,
            &NAME_PATTERN,
            "City is required",
            "City name can only contain letters, spaces, hyphens and apostrophes",
        ),
        Field::State => validate_pattern(
            value,
            &STATE_PATTERN,
            "State is required",
            "Please enter a valid 2-letter state code (e.g., WA)",
        ),
        Field::ZipCode => validate_pattern(
            value,
            &ZIP_PATTERN,
            "ZIP Code is required",
            "Please enter a valid 5-digit ZIP code or ZIP+4",
        ),
    };

    result.unwrap_or_default()
}

/// Validate every required field of a record. Address is optional and skipped.
pub fn validate_form(contact: &Contact) -> FieldErrors {
    Field::ALL
        .into_iter()
        .filter(Field::is_required)
        .filter_map(|field| {
            let error = validate_field(field, field.value_of(contact));
            (!error.is_empty()).then_some((field, error))
        })
        .collect()
}

pub fn is_valid(contact: &Contact) -> bool {
    validate_form(contact).is_empty()
}

fn validate_name(label: &str, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{} is required", label));
    }
    if trimmed.chars().count() < NAME_MIN_LEN {
        return Some(format!("{} must be at least {} characters", label, NAME_MIN_LEN));
    }
    if !NAME_PATTERN.is_match(value) {
        return Some(format!(
            "{} can only contain letters, spaces, hyphens and apostrophes",
            label
        ));
    }
    None
}

fn validate_pattern(value: &str, pattern: &Regex, required: &str, invalid: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(required.to_string());
    }
    if !pattern.is_match(value) {
        return Some(invalid.to_string());
    }
    None
}
