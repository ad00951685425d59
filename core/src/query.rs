// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

use url::form_urlencoded;

/// What to do with a parameter that has no value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbsentValue {
    /// Leave the parameter out entirely
    Omit,

    /// Send it as `key=`
    Empty,
}

/// Builds an escaped query string in insertion order.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    absent: AbsentValue,
    pairs: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new(absent: AbsentValue) -> Self {
        Self { absent, pairs: Vec::new() }
    }

    pub fn param<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.pairs.push((key.to_string(), value.to_string())),

            None => match self.absent {
                AbsentValue::Omit => {}
                AbsentValue::Empty => {
                    self.pairs.push((key.to_string(), String::new()))
                }
            },
        }

        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn finish(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Replace the query of `url` with the built one.
    pub fn apply(&self, mut url: Url) -> Url {
        if self.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.finish()));
        }

        url
    }
}

/// Timestamps in query strings are whole seconds in UTC.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
