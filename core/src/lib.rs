// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::DateTime;
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

mod app;
mod client;
mod error;
mod event;
mod pagination;
mod query;
mod secret;
mod sink;
mod token;
mod user;

pub use app::*;
pub use client::*;
pub use error::*;
pub use event::*;
pub use pagination::*;
pub use query::*;
pub use secret::*;
pub use sink::*;
pub use token::*;
pub use user::*;
