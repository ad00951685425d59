// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::AUTHORIZATION;
use slog::Logger;
use slog::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.us.onelogin.com";

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Clone, Debug)]
pub struct Config {
    /// Scheme and host of the API, e.g. `https://api.eu.onelogin.com`
    pub base_url: Url,

    /// Applied to every request; `None` waits indefinitely.
    pub timeout: Option<Duration>,

    pub user_page_size: u32,

    pub app_page_size: u32,
}

impl Config {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: None,
            user_page_size: DEFAULT_PAGE_SIZE,
            app_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        // A constant that always parses.
        Self::new(Url::parse(DEFAULT_BASE_URL).expect("default base url"))
    }
}

/// A OneLogin API client. Every operation is a blocking call; operations
/// other than `issue_token` take the bearer token to use.
pub struct OneLogin {
    pub(crate) log: Logger,
    http: Client,
    config: Config,
}

impl OneLogin {
    pub fn new(log: Logger, config: Config) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_1)
            .user_agent(concat!("onelogin-rs/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build()?;

        Ok(Self { log, http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve an API path such as `/api/2/users` against the base url.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.config.base_url.join(path).map_err(|e| {
            Error::fetch(path, None, format!("bad url for {path}: {e}"))
        })
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.http.post(url)
    }

    pub(crate) fn put(&self, token: &Token, url: Url) -> RequestBuilder {
        self.http.put(url).header(AUTHORIZATION, token.authorization())
    }

    /// Issue one authenticated GET and hand back a successful response.
    /// 401 maps to `Error::Auth`, everything else to `Error::Fetch`.
    pub(crate) fn get(
        &self,
        token: &Token,
        endpoint: &str,
        url: Url,
    ) -> Result<Response, Error> {
        debug!(self.log, "GET {url}");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, token.authorization())
            .send()
            .map_err(|e| Error::fetch(endpoint, e.status(), e.to_string()))?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::auth(
                endpoint,
                Some(status),
                describe_response(status, response),
            ));
        }

        if !status.is_success() {
            return Err(Error::fetch(
                endpoint,
                Some(status),
                describe_response(status, response),
            ));
        }

        Ok(response)
    }
}
