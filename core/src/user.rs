// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use reqwest::header::CONTENT_TYPE;
use slog::info;

pub const USERS_PATH: &str = "/api/2/users";

/// Updates still go through the version 1 API.
pub const USER_UPDATE_PATH: &str = "/api/1/users";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub id: u64,

    #[serde(default)]
    pub username: Option<String>,

    /// Alternate identifier, usually synced from Active Directory
    #[serde(default)]
    pub samaccountname: Option<String>,

    /// Every other attribute the server returned
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Client-side selection of users. The list endpoint cannot filter by these
/// fields, so matching happens after every page has been fetched.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum UserFilter {
    #[default]
    All,
    Usernames(BTreeSet<String>),
    Ids(BTreeSet<u64>),
    SamAccountNames(BTreeSet<String>),
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        fn contains(set: &BTreeSet<String>, field: &Option<String>) -> bool {
            field.as_ref().is_some_and(|value| set.contains(value))
        }

        match self {
            UserFilter::All => true,
            UserFilter::Usernames(names) => contains(names, &user.username),
            UserFilter::Ids(ids) => ids.contains(&user.id),
            UserFilter::SamAccountNames(names) => {
                contains(names, &user.samaccountname)
            }
        }
    }

    /// Keep matching users, in their original order.
    pub fn apply(&self, users: Vec<User>) -> Vec<User> {
        match self {
            UserFilter::All => users,
            _ => users.into_iter().filter(|u| self.matches(u)).collect(),
        }
    }
}

/// Exactly one way of naming a user
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserIdentifier {
    Id(u64),
    Username(String),
    SamAccountName(String),
}

impl UserIdentifier {
    fn filter(&self) -> UserFilter {
        match self {
            UserIdentifier::Id(id) => UserFilter::Ids(BTreeSet::from([*id])),
            UserIdentifier::Username(name) => {
                UserFilter::Usernames(BTreeSet::from([name.clone()]))
            }
            UserIdentifier::SamAccountName(name) => {
                UserFilter::SamAccountNames(BTreeSet::from([name.clone()]))
            }
        }
    }
}

impl std::fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserIdentifier::Id(id) => write!(f, "id {id}"),
            UserIdentifier::Username(name) => write!(f, "username {name}"),
            UserIdentifier::SamAccountName(name) => {
                write!(f, "samaccountname {name}")
            }
        }
    }
}

/// A new value for one user property. An empty `Text` clears the property,
/// which is how a user is taken out of their group.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl PropertyValue {
    /// Interpret command-line input: integers and booleans are sent as
    /// such, anything else as a string.
    pub fn parse(input: &str) -> Self {
        if let Ok(n) = input.parse::<i64>() {
            PropertyValue::Integer(n)
        } else if let Ok(b) = input.parse::<bool>() {
            PropertyValue::Boolean(b)
        } else {
            PropertyValue::Text(input.to_string())
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(n: i64) -> Self {
        PropertyValue::Integer(n)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Integer(n.into())
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

/// The body of a user update: property name to new value
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct UserProperties(BTreeMap<String, PropertyValue>);

impl UserProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn clear(self, name: impl Into<String>) -> Self {
        self.set(name, "")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// The version 1 response to a user update
#[derive(Deserialize)]
struct UpdateResponse {
    status: ApiStatus,

    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

#[derive(Clone, Debug)]
pub struct UpdatedUser {
    pub id: u64,
    pub status: ApiStatus,

    /// The user as the server echoed it back, if it did
    pub user: Option<User>,
}

impl OneLogin {
    /// Fetch every user, then keep those `filter` selects.
    pub fn list_users(
        &self,
        token: &Token,
        filter: &UserFilter,
    ) -> Result<Vec<User>, Error> {
        self.fetch_users(token, filter).map_err(log_failure(&self.log))
    }

    pub(crate) fn fetch_users(
        &self,
        token: &Token,
        filter: &UserFilter,
    ) -> Result<Vec<User>, Error> {
        let base = self.endpoint(USERS_PATH)?;
        let cursor = PageCursor::counter(
            self.config().user_page_size,
            CounterStop::ShortPage,
        );

        let users: Vec<User> =
            self.fetch_all(token, USERS_PATH, base, cursor)?;
        let fetched = users.len();
        let users = filter.apply(users);

        info!(
            self.log,
            "listed users";
            "fetched" => fetched,
            "matched" => users.len(),
        );

        Ok(users)
    }

    /// Turn a username or samaccountname into a numeric id by listing users.
    pub fn resolve_user_id(
        &self,
        token: &Token,
        identifier: &UserIdentifier,
    ) -> Result<u64, Error> {
        self.find_user_id(token, identifier).map_err(log_failure(&self.log))
    }

    fn find_user_id(
        &self,
        token: &Token,
        identifier: &UserIdentifier,
    ) -> Result<u64, Error> {
        if let UserIdentifier::Id(id) = identifier {
            return Ok(*id);
        }

        let matches = self.fetch_users(token, &identifier.filter())?;

        match matches.as_slice() {
            [] => Err(Error::UserNotFound(identifier.clone())),
            [user] => Ok(user.id),
            _ => Err(Error::AmbiguousUser {
                identifier: identifier.clone(),
                count: matches.len(),
            }),
        }
    }

    /// Set properties on one user with a single PUT. Nothing is sent if
    /// the identifier does not resolve to exactly one user.
    pub fn update_user(
        &self,
        token: &Token,
        identifier: &UserIdentifier,
        properties: &UserProperties,
    ) -> Result<UpdatedUser, Error> {
        self.put_user(token, identifier, properties)
            .map_err(log_failure(&self.log))
    }

    fn put_user(
        &self,
        token: &Token,
        identifier: &UserIdentifier,
        properties: &UserProperties,
    ) -> Result<UpdatedUser, Error> {
        let user_id = self.find_user_id(token, identifier)?;
        let path = format!("{USER_UPDATE_PATH}/{user_id}");

        let failed = |status: Option<StatusCode>,
                      server: Option<ApiStatus>,
                      message: String| Error::Update {
            user_id,
            status,
            server,
            message,
        };

        let url = self
            .endpoint(&path)
            .map_err(|e| failed(None, None, e.to_string()))?;

        let response = self
            .put(token, url)
            .header(CONTENT_TYPE, "application/json")
            .json(properties)
            .send()
            .map_err(|e| failed(e.status(), None, e.to_string()))?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::auth(
                &path,
                Some(status),
                describe_response(status, response),
            ));
        }

        let body = response
            .text()
            .map_err(|e| failed(Some(status), None, e.to_string()))?;

        let parsed: UpdateResponse =
            serde_json::from_str(&body).map_err(|e| {
                failed(
                    Some(status),
                    None,
                    format!("HTTP {status}, unexpected body ({e}): {body}"),
                )
            })?;

        if parsed.status.error || !status.is_success() {
            let message = parsed.status.to_string();
            return Err(failed(Some(status), Some(parsed.status), message));
        }

        let user = parsed
            .data
            .and_then(|data| data.into_iter().next())
            .and_then(|value| serde_json::from_value::<User>(value).ok());

        info!(
            self.log,
            "updated user {user_id}";
            "properties" => properties.names().collect::<Vec<_>>().join(","),
        );

        Ok(UpdatedUser { id: user_id, status: parsed.status, user })
    }
}
