use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};

use crate::error::{ClientError, ErrorKind};

/// Handler failure rendered as `{message, error, fieldErrors?}`
#[derive(Debug)]
pub struct ApiFailure(pub ClientError);

impl From<ClientError> for ApiFailure {
    fn from(err: ClientError) -> Self {
        ApiFailure(err)
    }
}

impl ApiFailure {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiFailure(ClientError::Auth(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        let code = match self.0.kind() {
            ErrorKind::Validation => 400,
            _ => self.0.status_code().unwrap_or(500),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "message": self.0.to_string(),
            "error": self.0.error_code(),
        });
        if let Some(errors) = self.0.field_errors() {
            let fields: Map<String, Value> = errors
                .iter()
                .map(|(field, msg)| (field.name().to_string(), Value::String(msg.clone())))
                .collect();
            body["fieldErrors"] = Value::Object(fields);
        }
        body
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        } else {
            tracing::debug!("request rejected with {}: {}", status.as_u16(), self.0);
        }
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;
    use std::collections::BTreeMap;

    #[test]
    fn validation_failures_are_400_with_field_errors() {
        let mut errors = BTreeMap::new();
        errors.insert(Field::ZipCode, "ZIP Code is required".to_string());
        let failure = ApiFailure(ClientError::validation(errors));

        assert_eq!(failure.status(), StatusCode::BAD_REQUEST);
        let body = failure.to_json();
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["fieldErrors"]["zipCode"], "ZIP Code is required");
    }

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(ApiFailure::unauthorized("no").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiFailure(ClientError::NotFound("gone".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiFailure(ClientError::Decode("bad".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
