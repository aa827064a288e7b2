//! Drive credential resolution
//!
//! Two supported credential shapes. A service-account key file carries its
//! own RSA key and token endpoint; we sign a JWT and exchange it for an
//! access token. An installed-app client secret needs a previously issued
//! refresh token from the token file next to it.

use crate::config::DriveConfig;
use crate::error::{Error, Result};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Resolve an access token from the configured credential files.
pub(super) async fn access_token(http: &Client, config: &DriveConfig) -> Result<String> {
    let secret_raw = std::fs::read_to_string(&config.client_secret_file).map_err(|e| {
        Error::drive_auth(format!(
            "Cannot read credentials file '{}': {e}",
            config.client_secret_file
        ))
    })?;
    let secret: Value = serde_json::from_str(&secret_raw)?;

    if secret.get("type").and_then(Value::as_str) == Some("service_account") {
        let key: ServiceAccountKey = serde_json::from_value(secret)?;
        service_account_token(http, &key, &config.scopes).await
    } else {
        refresh_token_flow(http, &secret, &config.token_file).await
    }
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Sign a service-account JWT and exchange it for an access token.
async fn service_account_token(
    http: &Client,
    key: &ServiceAccountKey,
    scopes: &[String],
) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = JwtClaims {
        iss: key.client_email.clone(),
        scope: scopes.join(" "),
        aud: key.token_uri.clone(),
        iat: now,
        exp: now + TOKEN_LIFETIME_SECONDS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| Error::drive_auth(format!("Invalid service account key: {e}")))?;
    let jwt = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| Error::drive_auth(format!("Failed to sign JWT: {e}")))?;

    debug!(issuer = %key.client_email, "Exchanging service account JWT");
    let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", &jwt)];
    exchange(http, &key.token_uri, &form).await
}

/// Exchange a stored refresh token for an access token.
async fn refresh_token_flow(http: &Client, secret: &Value, token_file: &str) -> Result<String> {
    let app = secret
        .get("installed")
        .or_else(|| secret.get("web"))
        .ok_or_else(|| {
            Error::drive_auth("Credentials file is neither a service account key nor a client secret")
        })?;
    let client_id = required_str(app, "client_id")?;
    let client_secret = required_str(app, "client_secret")?;
    let token_uri = required_str(app, "token_uri")?;

    let token_raw = std::fs::read_to_string(token_file).map_err(|e| {
        Error::drive_auth(format!("Cannot read token file '{token_file}': {e}"))
    })?;
    let token: Value = serde_json::from_str(&token_raw)?;
    let refresh_token = required_str(&token, "refresh_token")?;

    debug!(client_id, "Refreshing Drive access token");
    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
    ];
    exchange(http, token_uri, &form).await
}

async fn exchange(http: &Client, token_uri: &str, form: &[(&str, &str)]) -> Result<String> {
    let response = http.post(token_uri).form(form).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::drive_auth(format!(
            "Token request failed with status {status}: {body}"
        )));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}

fn required_str<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::drive_auth(format!("Credentials are missing '{field}'")))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}
