// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use httpmock::MockServer;
use serde_json::Value;
use serde_json::json;
use slog::Logger;

use onelogin_rs::Config;
use onelogin_rs::OneLogin;
use onelogin_rs::Secret;
use onelogin_rs::Token;

pub fn test_log() -> Logger {
    Logger::root(slog::Discard, slog::o!())
}

pub fn client(server: &MockServer) -> OneLogin {
    client_with_page_size(server, 50)
}

pub fn client_with_page_size(server: &MockServer, page_size: u32) -> OneLogin {
    let mut config = Config::new(server.base_url().parse().unwrap());
    config.user_page_size = page_size;
    config.app_page_size = page_size;

    OneLogin::new(test_log(), config).unwrap()
}

pub fn token() -> Token {
    Token::new(
        Secret::new("tok"),
        "2024-01-01T00:00:00Z".parse().unwrap(),
        36000,
    )
    .unwrap()
}

pub fn user(id: u64, username: &str, samaccountname: Option<&str>) -> Value {
    json!({
        "id": id,
        "username": username,
        "samaccountname": samaccountname,
        "email": format!("{username}@dundermifflin.com"),
    })
}

pub fn app(id: u64, name: &str) -> Value {
    json!({ "id": id, "name": name, "auth_method": 2, "visible": true })
}

pub fn event(id: u64) -> Value {
    json!({
        "id": id,
        "created_at": "2024-05-01T10:00:00.000Z",
        "event_type_id": 5,
        "user_id": 42,
        "client_id": null,
        "directory_id": null,
        "resolution": null,
    })
}

pub fn v1_envelope(data: Vec<Value>, next_link: Option<String>) -> Value {
    json!({
        "status": { "error": false, "code": 200, "type": "success", "message": "Success" },
        "pagination": {
            "before_cursor": null,
            "after_cursor": null,
            "previous_link": null,
            "next_link": next_link,
        },
        "data": data,
    })
}
