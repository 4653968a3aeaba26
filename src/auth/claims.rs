use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::Session;
use crate::error::ClientError;

/// Claims the client cares about when the bearer token happens to be a JWT
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TokenClaims {
    pub fn subject(&self) -> Option<&str> {
        self.username.as_deref().or(self.sub.as_deref())
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }
}

/// Read the payload of a JWT without checking its signature. The client has no
/// key; the server is the one that verifies. Opaque tokens return `None`.
pub fn read_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

/// Build a session from a login response body.
///
/// Accepted shapes: a bare token string, `{token, username, role, expiration}`
/// and `{token, user: {username, role}}`. Gaps are filled from the token's
/// claims, then from the login input and `default_lifetime`.
pub fn session_from_login(
    body: &Value,
    username: &str,
    default_lifetime: Duration,
    now: DateTime<Utc>,
) -> Result<Session, ClientError> {
    let token = match body {
        Value::String(token) => Some(token.clone()),
        Value::Object(map) => map.get("token").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
    .filter(|t| !t.trim().is_empty())
    .ok_or_else(|| ClientError::Auth("No token received from server".to_string()))?;

    let user = body.get("user");
    let field = |name: &str| {
        body.get(name)
            .or_else(|| user.and_then(|u| u.get(name)))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let claims = read_claims(&token).unwrap_or_default();

    let username = field("username")
        .or_else(|| claims.subject().map(str::to_string))
        .unwrap_or_else(|| username.to_string());
    let role = field("role").or_else(|| claims.role.clone());
    let expiration = body
        .get("expiration")
        .and_then(parse_expiration)
        .or_else(|| claims.expiration())
        .unwrap_or(now + default_lifetime);

    Ok(Session {
        token,
        username,
        role,
        expiration,
    })
}

/// Accepts RFC 3339 text or a Unix timestamp in seconds or milliseconds
pub fn parse_expiration(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Anything past year 33658 in seconds is really milliseconds
            if raw > 1_000_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn jwt(claims: &TokenClaims) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(b"server-only")).unwrap()
    }

    #[test]
    fn bare_token_uses_login_input_and_default_lifetime() {
        let session = session_from_login(&json!("opaque-token"), "alice", Duration::hours(2), now()).unwrap();
        assert_eq!(session.token, "opaque-token");
        assert_eq!(session.username, "alice");
        assert_eq!(session.role, None);
        assert_eq!(session.expiration, now() + Duration::hours(2));
    }

    #[test]
    fn object_response_fields_win() {
        let body = json!({
            "token": "abc",
            "username": "bob",
            "role": "admin",
            "expiration": "2026-01-02T00:00:00Z"
        });
        let session = session_from_login(&body, "typed-name", Duration::hours(1), now()).unwrap();
        assert_eq!(session.username, "bob");
        assert_eq!(session.role.as_deref(), Some("admin"));
        assert_eq!(session.expiration, Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn nested_user_object_is_read() {
        let body = json!({ "token": "abc", "user": { "username": "carol", "role": "viewer" } });
        let session = session_from_login(&body, "x", Duration::hours(1), now()).unwrap();
        assert_eq!(session.username, "carol");
        assert_eq!(session.role.as_deref(), Some("viewer"));
    }

    #[test]
    fn jwt_claims_fill_the_gaps() {
        let exp = now() + Duration::minutes(30);
        let token = jwt(&TokenClaims {
            sub: Some("dave".to_string()),
            role: Some("user".to_string()),
            exp: Some(exp.timestamp()),
            ..TokenClaims::default()
        });

        let session = session_from_login(&json!({ "token": token }), "typed", Duration::hours(5), now()).unwrap();
        assert_eq!(session.username, "dave");
        assert_eq!(session.role.as_deref(), Some("user"));
        assert_eq!(session.expiration.timestamp(), exp.timestamp());
    }

    #[test]
    fn missing_token_is_an_auth_error() {
        let err = session_from_login(&json!({ "user": {} }), "x", Duration::hours(1), now()).unwrap_err();
        assert_eq!(err.user_message(), "No token received from server");
        assert!(session_from_login(&json!({ "token": "" }), "x", Duration::hours(1), now()).is_err());
    }

    #[test]
    fn opaque_tokens_have_no_claims() {
        assert!(read_claims("not-a-jwt").is_none());
    }

    #[test]
    fn expiration_accepts_seconds_and_millis() {
        let secs = parse_expiration(&json!(1_767_268_800)).unwrap();
        let millis = parse_expiration(&json!(1_767_268_800_000i64)).unwrap();
        assert_eq!(secs, millis);
        assert!(parse_expiration(&json!(true)).is_none());
    }
}
