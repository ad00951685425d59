// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

use slog::Logger;
use slog::error;

/// The `status` block OneLogin wraps around version 1 responses.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ApiStatus {
    pub error: bool,

    #[serde(default)]
    pub code: Option<i64>,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    /// Usually a string, but some validation failures send an object.
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ApiStatus {
    pub fn message_text(&self) -> String {
        match &self.message {
            None => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl std::fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.code.map(|c| c.to_string()).unwrap_or_default(),
            self.error_type.as_deref().unwrap_or("error"),
            self.message_text(),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The token request failed, or an API call was refused with 401.
    #[error("authentication against {endpoint} failed: {message}")]
    Auth { endpoint: String, status: Option<StatusCode>, message: String },

    /// A page request failed or its response could not be used.
    #[error("fetching {endpoint} failed: {message}")]
    Fetch { endpoint: String, status: Option<StatusCode>, message: String },

    #[error("no user matches {0}")]
    UserNotFound(UserIdentifier),

    #[error("{identifier} matches {count} users")]
    AmbiguousUser { identifier: UserIdentifier, count: usize },

    #[error("updating user {user_id} failed: {message}")]
    Update {
        user_id: u64,
        status: Option<StatusCode>,
        server: Option<ApiStatus>,
        message: String,
    },
}

impl Error {
    pub(crate) fn auth(
        endpoint: &str,
        status: Option<StatusCode>,
        message: impl Into<String>,
    ) -> Self {
        Error::Auth {
            endpoint: endpoint.to_string(),
            status,
            message: message.into(),
        }
    }

    pub(crate) fn fetch(
        endpoint: &str,
        status: Option<StatusCode>,
        message: impl Into<String>,
    ) -> Self {
        Error::Fetch {
            endpoint: endpoint.to_string(),
            status,
            message: message.into(),
        }
    }

    /// The HTTP status the server answered with, if the failure got that far
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Auth { status, .. }
            | Error::Fetch { status, .. }
            | Error::Update { status, .. } => *status,

            Error::UserNotFound(_) | Error::AmbiguousUser { .. } => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }
}

/// Log an error on its way out to the caller.
pub(crate) fn log_failure(log: &Logger) -> impl FnOnce(Error) -> Error {
    move |e| {
        error!(log, "{e}"; "http_status" => e.status().map(|s| s.as_u16()));
        e
    }
}

/// Render a non-success response as "HTTP <status>: <body>".
pub(crate) fn describe_response(
    status: StatusCode,
    response: reqwest::blocking::Response,
) -> String {
    let body = response.text().unwrap_or_default();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}
