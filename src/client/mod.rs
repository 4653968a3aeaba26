//! Thin HTTP transport: joins paths onto the base URL, attaches the bearer
//! token from the session store and turns failures into [`ClientError`].

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::error::ClientError;
use crate::validation::{Field, FieldErrors};

#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::BadRequest(format!("Invalid API URL '{}': {}", base_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn from_config(config: &AppConfig, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        Self::new(&config.api.base_url, config.request_timeout(), session)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// `path` is appended to the base URL's own path, so a base of
    /// `https://host/app` and `/api/v2/contacts` give `https://host/app/api/v2/contacts`.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| ClientError::BadRequest(format!("Invalid request path '{}': {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ClientError> {
        let request = self.request(Method::GET, path)?.query(query);
        let response = self.send(request, true).await?;
        read_json(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.send(request, true).await?;
        read_json(response).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let request = self.request(Method::PUT, path)?.json(body);
        let response = self.send(request, true).await?;
        read_json(response).await
    }

    /// DELETE; any success status counts, the body is ignored
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, path)?;
        self.send(request, true).await?;
        Ok(())
    }

    /// POST without a bearer token (login)
    pub async fn post_public<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.send(request, false).await?;
        read_json(response).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.url(path)?))
    }

    async fn send(&self, request: RequestBuilder, authenticated: bool) -> Result<Response, ClientError> {
        let request = if authenticated {
            let token = match self.session.token().await {
                Some(token) => token,
                None => return Err(ClientError::not_logged_in()),
            };
            request.bearer_auth(token)
        } else {
            request
        };

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} {}", status.as_u16(), response.url());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = error_from_body(status.as_u16(), &body);
        tracing::warn!("request failed with {}: {}", status.as_u16(), err);
        Err(err)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.text().await?;
    // Some endpoints answer 200/204 with no body; let `Value`/`Option` targets see null
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    Ok(serde_json::from_str(body)?)
}

/// Error for a failed response. A 400 that names the offending fields comes
/// back as a validation error so the form can mark them.
fn error_from_body(status: u16, body: &str) -> ClientError {
    if matches!(status, 400 | 422) {
        if let Some(errors) = field_errors(body) {
            return ClientError::validation(errors);
        }
    }
    ClientError::from_status(status, error_message(body))
}

/// `{fieldErrors: {<field>: <message>}}`, keeping the fields the form knows
fn field_errors(body: &str) -> Option<FieldErrors> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;
    let errors: FieldErrors = value
        .get("fieldErrors")?
        .as_object()?
        .iter()
        .filter_map(|(name, msg)| Some((Field::parse(name)?, msg.as_str()?.to_string())))
        .collect();
    (!errors.is_empty()).then_some(errors)
}

/// Pull a human-readable message out of an error body: `{message}`,
/// `{error: "..."}`, or a plain-text body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => ["message", "error", "title"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        // Short plain-text bodies are shown as-is; HTML error pages are not
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}
