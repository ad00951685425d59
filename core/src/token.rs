// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

use chrono::SubsecRound;
use chrono::TimeDelta;
use serde_json::json;
use slog::info;

pub const TOKEN_PATH: &str = "/auth/oauth2/v2/token";

/// API credentials created in the OneLogin admin portal
#[derive(Clone, Debug)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: Secret,
}

impl Credential {
    pub fn new(client_id: impl Into<String>, client_secret: Secret) -> Self {
        Self { client_id: client_id.into(), client_secret }
    }
}

/// The body of a successful token response.
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<Secret>,

    #[serde(default)]
    refresh_token: Option<Secret>,

    #[serde(default)]
    token_type: Option<String>,

    #[serde(default)]
    account_id: Option<u64>,

    created_at: DateTime<Utc>,

    expires_in: i64,
}

/// A bearer token. Nothing refreshes it: once `expires_at` passes, ask for
/// a new one.
#[derive(Clone, Debug)]
pub struct Token {
    pub access_token: Secret,
    pub refresh_token: Option<Secret>,
    pub token_type: String,
    pub account_id: Option<u64>,
    pub created_at: DateTime<Utc>,

    /// Lifetime in seconds
    pub expires_in: i64,

    /// `created_at + expires_in`, whole seconds
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Returns `None` if the expiry falls outside the representable range.
    pub fn new(
        access_token: Secret,
        created_at: DateTime<Utc>,
        expires_in: i64,
    ) -> Option<Self> {
        let expires_at = TimeDelta::try_seconds(expires_in)
            .and_then(|ttl| created_at.checked_add_signed(ttl))?
            .trunc_subsecs(0);

        Some(Self {
            access_token,
            refresh_token: None,
            token_type: String::from("bearer"),
            account_id: None,
            created_at,
            expires_in,
            expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The `Authorization` header value for API calls.
    pub(crate) fn authorization(&self) -> String {
        format!("bearer {}", self.access_token.expose())
    }
}

impl OneLogin {
    /// Exchange client credentials for a bearer token.
    pub fn issue_token(&self, credential: &Credential) -> Result<Token, Error> {
        self.request_token(credential).map_err(log_failure(&self.log))
    }

    fn request_token(&self, credential: &Credential) -> Result<Token, Error> {
        let url = self.endpoint(TOKEN_PATH).map_err(|e| {
            Error::auth(TOKEN_PATH, None, e.to_string())
        })?;

        let response = self
            .post(url)
            .basic_auth(
                &credential.client_id,
                Some(credential.client_secret.expose()),
            )
            .json(&json!({ "grant_type": "client_credentials" }))
            .send()
            .map_err(|e| Error::auth(TOKEN_PATH, e.status(), e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::auth(
                TOKEN_PATH,
                Some(status),
                describe_response(status, response),
            ));
        }

        let body: TokenResponse = response.json().map_err(|e| {
            Error::auth(
                TOKEN_PATH,
                Some(status),
                format!("undecodable token response: {e}"),
            )
        })?;

        let access_token = match body.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(Error::auth(
                    TOKEN_PATH,
                    Some(status),
                    "response carried no access token",
                ));
            }
        };

        let mut token =
            Token::new(access_token, body.created_at, body.expires_in)
                .ok_or_else(|| {
                    Error::auth(
                        TOKEN_PATH,
                        Some(status),
                        format!("expires_in {} out of range", body.expires_in),
                    )
                })?;

        token.refresh_token = body.refresh_token;
        token.account_id = body.account_id;
        if let Some(token_type) = body.token_type {
            token.token_type = token_type;
        }

        info!(
            self.log,
            "issued token";
            "client_id" => &credential.client_id,
            "expires_at" => token.expires_at.to_rfc3339(),
        );

        Ok(token)
    }
}
