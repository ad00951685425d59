// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::Utc;
use clap::Args;
use clap::Subcommand;

use onelogin_rs::AppQuery;
use onelogin_rs::AuthMethod;
use onelogin_rs::EventQuery;
use onelogin_rs::EventUser;
use onelogin_rs::PropertyValue;
use onelogin_rs::UserFilter;
use onelogin_rs::UserIdentifier;
use onelogin_rs::UserProperties;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a bearer token and print it
    Token,

    /// List users
    Users(UserSelection),

    /// List apps
    Apps(AppArgs),

    /// List events
    Events(EventArgs),

    /// Set properties on one user
    UpdateUser(UpdateArgs),
}

/// At most one kind of selector; repeat it to select several users.
#[derive(Debug, Args)]
#[group(multiple = false)]
pub struct UserSelection {
    #[clap(long = "username")]
    pub usernames: Vec<String>,

    #[clap(long = "id")]
    pub ids: Vec<u64>,

    #[clap(long = "samaccountname")]
    pub samaccountnames: Vec<String>,
}

impl UserSelection {
    pub fn filter(&self) -> UserFilter {
        if !self.usernames.is_empty() {
            UserFilter::Usernames(self.usernames.iter().cloned().collect())
        } else if !self.ids.is_empty() {
            UserFilter::Ids(self.ids.iter().copied().collect::<BTreeSet<_>>())
        } else if !self.samaccountnames.is_empty() {
            UserFilter::SamAccountNames(
                self.samaccountnames.iter().cloned().collect(),
            )
        } else {
            UserFilter::All
        }
    }
}

#[derive(Debug, Args)]
pub struct AppArgs {
    /// Name or numeric code, e.g. `saml` or `2`
    #[clap(long)]
    pub auth_method: Option<AuthMethod>,

    /// Exact name, or a prefix ending in `*`
    #[clap(long)]
    pub name: Option<String>,
}

impl AppArgs {
    pub fn query(&self) -> AppQuery {
        AppQuery { auth_method: self.auth_method, name: self.name.clone() }
    }
}

#[derive(Debug, Args)]
pub struct EventArgs {
    #[clap(long)]
    pub event_type_id: Option<u64>,

    /// RFC 3339 timestamp, e.g. 2024-01-31T00:00:00Z
    #[clap(long)]
    pub since: Option<DateTime<Utc>>,

    /// RFC 3339 timestamp
    #[clap(long)]
    pub until: Option<DateTime<Utc>>,

    #[clap(long = "event-client-id")]
    pub client_id: Option<String>,

    #[clap(long)]
    pub directory_id: Option<u64>,

    #[clap(long = "event-id")]
    pub id: Option<u64>,

    #[clap(long)]
    pub resolution: Option<String>,

    #[clap(long, conflicts_with = "username")]
    pub user_id: Option<u64>,

    /// Resolved to an id first; an unknown name means all users
    #[clap(long)]
    pub username: Option<String>,
}

impl EventArgs {
    pub fn query(&self) -> EventQuery {
        let user = match (&self.user_id, &self.username) {
            (Some(id), _) => Some(EventUser::Id(*id)),
            (None, Some(name)) => Some(EventUser::Username(name.clone())),
            (None, None) => None,
        };

        EventQuery {
            event_type_id: self.event_type_id,
            since: self.since,
            until: self.until,
            client_id: self.client_id.clone(),
            directory_id: self.directory_id,
            id: self.id,
            resolution: self.resolution.clone(),
            user,
        }
    }
}

/// Exactly one way of naming the user to update
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct UserTarget {
    #[clap(long)]
    pub id: Option<u64>,

    #[clap(long)]
    pub username: Option<String>,

    #[clap(long)]
    pub samaccountname: Option<String>,
}

impl UserTarget {
    pub fn identifier(&self) -> Option<UserIdentifier> {
        match (&self.id, &self.username, &self.samaccountname) {
            (Some(id), _, _) => Some(UserIdentifier::Id(*id)),
            (None, Some(name), _) => {
                Some(UserIdentifier::Username(name.clone()))
            }
            (None, None, Some(name)) => {
                Some(UserIdentifier::SamAccountName(name.clone()))
            }
            (None, None, None) => None,
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[clap(flatten)]
    pub target: UserTarget,

    /// `name=value`; integers and booleans are sent unquoted, and an empty
    /// value clears the property. Repeatable.
    #[clap(long = "set", value_parser = parse_assignment, required = true)]
    pub properties: Vec<(String, PropertyValue)>,
}

impl UpdateArgs {
    pub fn properties(&self) -> UserProperties {
        self.properties
            .iter()
            .cloned()
            .fold(UserProperties::new(), |props, (name, value)| {
                props.set(name, value)
            })
    }
}

pub fn parse_assignment(s: &str) -> Result<(String, PropertyValue), String> {
    let Some((name, value)) = s.split_once('=') else {
        return Err(format!("{s} is not of the form name=value"));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("{s} has an empty property name"));
    }

    Ok((name.to_string(), PropertyValue::parse(value)))
}

#[cfg(test)]
mod test {
    use super::*;

    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestArgs {
        #[clap(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        TestArgs::try_parse_from(std::iter::once("onelogin").chain(args.iter().copied()))
            .map(|a| a.command)
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("group_id=123").unwrap(),
            ("group_id".to_string(), PropertyValue::Integer(123))
        );
        assert_eq!(
            parse_assignment("group_id=").unwrap(),
            ("group_id".to_string(), PropertyValue::Text(String::new()))
        );
        assert_eq!(
            parse_assignment("title=a=b").unwrap(),
            ("title".to_string(), PropertyValue::Text("a=b".to_string()))
        );
        assert!(parse_assignment("group_id").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn test_user_selectors_are_exclusive() {
        let Command::Users(selection) =
            parse(&["users", "--id", "2", "--id", "3"]).unwrap()
        else {
            panic!("expected users");
        };
        assert_eq!(selection.filter(), UserFilter::Ids(BTreeSet::from([2, 3])));

        assert!(parse(&["users", "--id", "2", "--username", "x"]).is_err());

        let Command::Users(selection) = parse(&["users"]).unwrap() else {
            panic!("expected users");
        };
        assert_eq!(selection.filter(), UserFilter::All);
    }

    #[test]
    fn test_update_requires_one_target() {
        assert!(parse(&["update-user", "--set", "a=1"]).is_err());
        assert!(
            parse(&["update-user", "--id", "1", "--username", "x", "--set", "a=1"])
                .is_err()
        );
        assert!(parse(&["update-user", "--id", "1"]).is_err());

        let Command::UpdateUser(update) = parse(&[
            "update-user",
            "--username",
            "dschrute",
            "--set",
            "group_id=",
            "--set",
            "title=Assistant",
        ])
        .unwrap() else {
            panic!("expected update-user");
        };

        assert_eq!(
            update.target.identifier(),
            Some(UserIdentifier::Username("dschrute".to_string()))
        );
        assert_eq!(
            update.properties(),
            UserProperties::new().clear("group_id").set("title", "Assistant")
        );
    }

    #[test]
    fn test_event_args() {
        let Command::Events(events) = parse(&[
            "events",
            "--username",
            "jhalpert",
            "--since",
            "2024-01-31T00:00:00Z",
        ])
        .unwrap() else {
            panic!("expected events");
        };

        let query = events.query();
        assert_eq!(query.user, Some(EventUser::Username("jhalpert".to_string())));
        assert_eq!(
            query.since,
            Some("2024-01-31T00:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );

        assert!(parse(&["events", "--user-id", "1", "--username", "x"]).is_err());
    }

    #[test]
    fn test_app_args() {
        let Command::Apps(apps) =
            parse(&["apps", "--auth-method", "saml"]).unwrap()
        else {
            panic!("expected apps");
        };

        assert_eq!(
            apps.query(),
            AppQuery { auth_method: Some(AuthMethod::Saml), name: None }
        );
    }
}
