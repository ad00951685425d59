// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

use slog::info;

pub const APPS_PATH: &str = "/api/2/apps";

/// How an app signs users in. Codes the client does not know are kept as
/// `Other`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(from = "u8", into = "u8")]
pub enum AuthMethod {
    Password,
    OpenId,
    Saml,
    Api,
    Google,
    Forms,
    WsFed,
    OpenIdConnect,
    Other(u8),
}

impl From<u8> for AuthMethod {
    fn from(code: u8) -> Self {
        match code {
            0 => AuthMethod::Password,
            1 => AuthMethod::OpenId,
            2 => AuthMethod::Saml,
            3 => AuthMethod::Api,
            4 => AuthMethod::Google,
            6 => AuthMethod::Forms,
            7 => AuthMethod::WsFed,
            8 => AuthMethod::OpenIdConnect,
            other => AuthMethod::Other(other),
        }
    }
}

impl From<AuthMethod> for u8 {
    fn from(method: AuthMethod) -> u8 {
        match method {
            AuthMethod::Password => 0,
            AuthMethod::OpenId => 1,
            AuthMethod::Saml => 2,
            AuthMethod::Api => 3,
            AuthMethod::Google => 4,
            AuthMethod::Forms => 6,
            AuthMethod::WsFed => 7,
            AuthMethod::OpenIdConnect => 8,
            AuthMethod::Other(code) => code,
        }
    }
}

// Accepts the variant name in any case, or the numeric code.
impl std::str::FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<u8>() {
            return Ok(AuthMethod::from(code));
        }

        match s.to_ascii_lowercase().as_str() {
            "password" => Ok(AuthMethod::Password),
            "openid" => Ok(AuthMethod::OpenId),
            "saml" => Ok(AuthMethod::Saml),
            "api" => Ok(AuthMethod::Api),
            "google" => Ok(AuthMethod::Google),
            "forms" => Ok(AuthMethod::Forms),
            "wsfed" => Ok(AuthMethod::WsFed),
            "openidconnect" | "oidc" => Ok(AuthMethod::OpenIdConnect),
            _ => Err(format!("{s} is not an auth method")),
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Other(code) => write!(f, "Other({code})"),
            known => write!(f, "{known:?}"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct App {
    pub id: u64,

    pub name: String,

    pub auth_method: AuthMethod,

    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Server-side filters for the app list
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppQuery {
    pub auth_method: Option<AuthMethod>,

    /// Exact name, or a prefix ending in `*`
    pub name: Option<String>,
}

impl AppQuery {
    fn query(&self) -> QueryBuilder {
        QueryBuilder::new(AbsentValue::Omit)
            .param("auth_method", self.auth_method.map(u8::from))
            .param("name", self.name.as_deref())
    }
}

impl OneLogin {
    /// Fetch every app matching `query`. The server's `Total-Count` header
    /// decides when to stop; without it the fetch fails.
    pub fn list_apps(
        &self,
        token: &Token,
        query: &AppQuery,
    ) -> Result<Vec<App>, Error> {
        self.fetch_apps(token, query).map_err(log_failure(&self.log))
    }

    fn fetch_apps(
        &self,
        token: &Token,
        query: &AppQuery,
    ) -> Result<Vec<App>, Error> {
        let base = query.query().apply(self.endpoint(APPS_PATH)?);
        let cursor = PageCursor::counter(
            self.config().app_page_size,
            CounterStop::TotalCount,
        );

        let apps: Vec<App> = self.fetch_all(token, APPS_PATH, base, cursor)?;

        info!(self.log, "listed apps"; "count" => apps.len());

        Ok(apps)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_auth_method_codes() {
        let app: App = serde_json::from_value(serde_json::json!({
            "id": 9,
            "name": "Salesforce",
            "auth_method": 2,
            "visible": true,
        }))
        .unwrap();

        assert_eq!(app.auth_method, AuthMethod::Saml);
        assert_eq!(app.properties["visible"], true);

        let app: App = serde_json::from_value(serde_json::json!({
            "id": 10,
            "name": "Legacy",
            "auth_method": 5,
        }))
        .unwrap();

        assert_eq!(app.auth_method, AuthMethod::Other(5));
        assert_eq!(serde_json::to_value(&app).unwrap()["auth_method"], 5);
    }

    #[test]
    fn test_auth_method_from_str() {
        assert_eq!("saml".parse::<AuthMethod>(), Ok(AuthMethod::Saml));
        assert_eq!("WsFed".parse::<AuthMethod>(), Ok(AuthMethod::WsFed));
        assert_eq!("8".parse::<AuthMethod>(), Ok(AuthMethod::OpenIdConnect));
        assert!("kerberos".parse::<AuthMethod>().is_err());
    }

    #[test]
    fn test_query_omits_absent() {
        assert_eq!(AppQuery::default().query().finish(), "");

        let query = AppQuery {
            auth_method: Some(AuthMethod::OpenIdConnect),
            name: Some("Slack*".to_string()),
        };
        assert_eq!(query.query().finish(), "auth_method=8&name=Slack*");
    }
}
