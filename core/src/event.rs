// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

use std::collections::BTreeSet;

use slog::info;
use slog::warn;

pub const EVENTS_PATH: &str = "/api/1/events";

/// The events endpoint always gets this page size.
pub const EVENT_PAGE_SIZE: u32 = 50;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    pub id: u64,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub event_type_id: Option<u64>,

    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub directory_id: Option<u64>,

    #[serde(default)]
    pub resolution: Option<serde_json::Value>,

    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Whose events to fetch
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventUser {
    Id(u64),

    /// Looked up with a full user listing before the events are fetched
    Username(String),
}

/// Equality filters for the event list. Every field is sent, empty when
/// unset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventQuery {
    pub event_type_id: Option<u64>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub client_id: Option<String>,
    pub directory_id: Option<u64>,
    pub id: Option<u64>,
    pub resolution: Option<String>,
    pub user: Option<EventUser>,
}

impl EventQuery {
    fn query(&self, user_id: Option<u64>) -> QueryBuilder {
        QueryBuilder::new(AbsentValue::Empty)
            .param("event_type_id", self.event_type_id)
            .param("since", self.since.as_ref().map(format_timestamp))
            .param("until", self.until.as_ref().map(format_timestamp))
            .param("client_id", self.client_id.as_deref())
            .param("directory_id", self.directory_id)
            .param("id", self.id)
            .param("resolution", self.resolution.as_deref())
            .param("user_id", user_id)
            .param("limit", Some(EVENT_PAGE_SIZE))
    }
}

impl OneLogin {
    /// Fetch every event matching `query`, following the server's
    /// `next_link` until it runs out.
    pub fn list_events(
        &self,
        token: &Token,
        query: &EventQuery,
    ) -> Result<Vec<Event>, Error> {
        self.fetch_events(token, query).map_err(log_failure(&self.log))
    }

    fn fetch_events(
        &self,
        token: &Token,
        query: &EventQuery,
    ) -> Result<Vec<Event>, Error> {
        let user_id = match &query.user {
            None => None,
            Some(EventUser::Id(id)) => Some(*id),
            Some(EventUser::Username(name)) => {
                self.event_user_id(token, name)?
            }
        };

        let first = query.query(user_id).apply(self.endpoint(EVENTS_PATH)?);
        let base = first.clone();

        let events: Vec<Event> = self.fetch_all(
            token,
            EVENTS_PATH,
            base,
            PageCursor::Link(first),
        )?;

        info!(self.log, "listed events"; "count" => events.len());

        Ok(events)
    }

    /// An unknown username widens the query to all users rather than
    /// failing it.
    fn event_user_id(
        &self,
        token: &Token,
        username: &str,
    ) -> Result<Option<u64>, Error> {
        let filter =
            UserFilter::Usernames(BTreeSet::from([username.to_string()]));
        let users = self.fetch_users(token, &filter)?;

        match users.first() {
            Some(user) => Ok(Some(user.id)),
            None => {
                warn!(
                    self.log,
                    "no user named {username}, fetching events for all users"
                );
                Ok(None)
            }
        }
    }
}
