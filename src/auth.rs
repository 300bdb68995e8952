// Credential provider: exchanges the application's client id and secret
// for a bearer token using the OAuth 2.0 client-credentials grant.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::Settings;
use crate::error::GatewayError;

/// Bearer token plus what we know about it.
#[derive(Clone)]
pub struct AccessToken {
    pub secret: String,
    pub expires_at: DateTime<Utc>,
    /// Application roles granted to the token, or the requested scope when
    /// the token payload cannot be read.
    pub roles: Vec<String>,
}

impl AccessToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// First 20 characters, for display.
    pub fn truncated(&self) -> String {
        let head: String = self.secret.chars().take(20).collect();
        format!("{}...", head)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("roles", &self.roles)
            .finish()
    }
}

/// Source of bearer tokens.
pub trait CredentialProvider {
    fn acquire_token(&self) -> Result<AccessToken, GatewayError>;
}

/// Client-credentials flow against `{authority}/{tenant}/oauth2/v2.0/token`.
pub struct ClientCredentials {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

const MAX_LIFETIME_SECS: u64 = 365 * 24 * 3600;

fn default_expires_in() -> u64 {
    3600
}

#[derive(Deserialize, Default)]
struct TokenClaims {
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    scp: Option<String>,
}

impl ClientCredentials {
    pub fn new(settings: &Settings) -> Result<Self, GatewayError> {
        let client = Client::builder().build()?;
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            settings.authority_host.trim_end_matches('/'),
            settings.tenant_id
        );
        Ok(ClientCredentials {
            client,
            token_url,
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            scope: settings.scope.clone(),
        })
    }
}

impl CredentialProvider for ClientCredentials {
    fn acquire_token(&self) -> Result<AccessToken, GatewayError> {
        tracing::debug!(url = %self.token_url, "POST token request");
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];
        let res = self.client.post(&self.token_url).form(&form).send()?;
        let status = res.status();
        if !status.is_success() {
            let txt = res.text().unwrap_or_default();
            // The token endpoint answers 400 for bad secrets and unknown tenants.
            return Err(match GatewayError::from_status(status, &txt) {
                GatewayError::Api { status, message } => {
                    GatewayError::Auth(format!("{} - {}", status, message))
                }
                other => other,
            });
        }
        let body: TokenResponse = res
            .json()
            .map_err(|e| GatewayError::Decode(format!("token response: {}", e)))?;

        let lifetime = i64::try_from(body.expires_in.min(MAX_LIFETIME_SECS)).unwrap_or(3600);
        let expires_at = Utc::now() + Duration::seconds(lifetime);
        let mut roles = token_roles(&body.access_token);
        if roles.is_empty() {
            roles.push(self.scope.clone());
        }
        tracing::info!(%expires_at, "access token acquired");
        Ok(AccessToken {
            secret: body.access_token,
            expires_at,
            roles,
        })
    }
}

/// Read the `roles` (application permissions) or `scp` (delegated) claim
/// from a JWT without verifying it. Opaque tokens yield an empty list.
pub fn token_roles(jwt: &str) -> Vec<String> {
    let claims = jwt
        .split('.')
        .nth(1)
        .and_then(|payload| URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok())
        .and_then(|bytes| serde_json::from_slice::<TokenClaims>(&bytes).ok())
        .unwrap_or_default();
    if !claims.roles.is_empty() {
        return claims.roles;
    }
    claims
        .scp
        .map(|scp| scp.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
