use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;

use super::auth::AuthUser;
use super::error::ApiFailure;
use super::DevState;
use crate::contact::{Contact, ContactId, Page};
use crate::gateway::{ContactGateway, PageQuery};
use crate::sort::{SortDirection, SortField};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedParams {
    pub search: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "sortby")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl PagedParams {
    fn into_query(self, default_page_size: u32) -> PageQuery {
        let order = match self.order.as_deref() {
            Some(o) if o.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        PageQuery {
            search: self.search,
            name: self.name,
            city: self.city,
            state: self.state,
            sort_by: self.sort_by.as_deref().and_then(SortField::parse),
            order,
            page_number: self.page_number.unwrap_or(1).max(1),
            page_size: self.page_size.unwrap_or(default_page_size).max(1),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// GET /api/:version/contacts
pub async fn list(State(state): State<DevState>) -> Result<Json<Vec<Contact>>, ApiFailure> {
    Ok(Json(state.contacts.list().await?))
}

/// GET /api/:version/contacts/paged
pub async fn list_paged(
    State(state): State<DevState>,
    Query(params): Query<PagedParams>,
) -> Result<Json<Page>, ApiFailure> {
    let query = params.into_query(state.page_size);
    Ok(Json(state.contacts.list_paged(&query).await?))
}

/// GET /api/:version/contacts/search?query=
pub async fn search(
    State(state): State<DevState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Contact>>, ApiFailure> {
    Ok(Json(state.contacts.search(&params.query).await?))
}

/// GET /api/:version/contacts/:id
pub async fn show(
    State(state): State<DevState>,
    Path((_version, id)): Path<(String, String)>,
) -> Result<Json<Contact>, ApiFailure> {
    Ok(Json(state.contacts.get(&ContactId::from(id.as_str())).await?))
}

/// POST /api/:version/contacts
pub async fn create(
    State(state): State<DevState>,
    Extension(user): Extension<AuthUser>,
    Json(contact): Json<Contact>,
) -> Result<(StatusCode, Json<Contact>), ApiFailure> {
    let created = state.contacts.create(&contact).await?;
    tracing::info!(
        "{} created contact {}",
        user.username,
        created.id.as_ref().map(ToString::to_string).unwrap_or_default()
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/:version/contacts/:id; the path id wins over any id in the body
pub async fn update(
    State(state): State<DevState>,
    Extension(user): Extension<AuthUser>,
    Path((_version, id)): Path<(String, String)>,
    Json(contact): Json<Contact>,
) -> Result<Json<Contact>, ApiFailure> {
    let contact = Contact {
        id: Some(ContactId::from(id.as_str())),
        ..contact
    };
    let updated = state.contacts.update(&contact).await?;
    tracing::info!("{} updated contact {}", user.username, id);
    Ok(Json(updated))
}

/// DELETE /api/:version/contacts/:id
pub async fn delete(
    State(state): State<DevState>,
    Extension(user): Extension<AuthUser>,
    Path((_version, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiFailure> {
    state.contacts.delete(&ContactId::from(id.as_str())).await?;
    tracing::info!("{} deleted contact {}", user.username, id);
    Ok(StatusCode::NO_CONTENT)
}
