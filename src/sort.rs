use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::contact::{Contact, ContactId};

/// Column a contact list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Last name, then first name
    Name,
    Email,
    PhoneNumber,
    City,
    State,
    ZipCode,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortField {
    /// Name used for the `sortby` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::PhoneNumber => "phoneNumber",
            SortField::City => "city",
            SortField::State => "state",
            SortField::ZipCode => "zipCode",
            SortField::Id => "id",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "lastname" | "last_name" => Some(SortField::Name),
            "email" => Some(SortField::Email),
            "phone" | "phonenumber" | "phone_number" => Some(SortField::PhoneNumber),
            "city" => Some(SortField::City),
            "state" => Some(SortField::State),
            "zip" | "zipcode" | "zip_code" => Some(SortField::ZipCode),
            "id" => Some(SortField::Id),
            _ => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_param())
    }
}

impl SortDirection {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn ascending(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Parse `"name"`, `"city desc"` or `"zip ASC"`; unknown columns yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        let mut it = s.split_whitespace();
        let field = SortField::parse(it.next()?)?;
        let direction = match it.next() {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Some(Self { field, direction })
    }

    pub fn compare(&self, a: &Contact, b: &Contact) -> Ordering {
        let ordering = match self.field {
            SortField::Name => locale_cmp(&a.last_name, &b.last_name)
                .then_with(|| locale_cmp(&a.first_name, &b.first_name)),
            SortField::Email => a.email.cmp(&b.email),
            SortField::PhoneNumber => a.phone_number.cmp(&b.phone_number),
            SortField::City => a.city.cmp(&b.city),
            SortField::State => a.state.cmp(&b.state),
            SortField::ZipCode => a.zip_code.cmp(&b.zip_code),
            SortField::Id => compare_ids(a.id.as_ref(), b.id.as_ref()),
        };

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Stable, sorted view over `contacts`; the slice itself keeps server order
pub fn sorted<'a>(contacts: &'a [Contact], key: &SortKey) -> Vec<&'a Contact> {
    let mut view: Vec<&Contact> = contacts.iter().collect();
    view.sort_by(|a, b| key.compare(a, b));
    view
}

/// Dictionary-style compare: letters order case-insensitively first, and on a
/// case-only difference the lower-case form sorts first.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn compare_ids(a: Option<&ContactId>, b: Option<&ContactId>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.to_string().cmp(&b.to_string()),
        },
        // Unsaved records go last
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
