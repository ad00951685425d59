// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use url::Url;

use onelogin_cli::Command;
use onelogin_cli::Runner;
use onelogin_rs::Config;
use onelogin_rs::Credential;
use onelogin_rs::DEFAULT_BASE_URL;
use onelogin_rs::DEFAULT_PAGE_SIZE;
use onelogin_rs::LogTarget;
use onelogin_rs::OneLogin;
use onelogin_rs::Secret;
use onelogin_rs::Severity;
use onelogin_rs::build_logger;

#[derive(Debug, Parser)]
#[clap(about = "OneLogin API client")]
struct Args {
    #[clap(long, env = "ONELOGIN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: Url,

    #[clap(long, env = "ONELOGIN_CLIENT_ID")]
    client_id: String,

    #[clap(long, env = "ONELOGIN_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Per-request timeout in seconds
    #[clap(long, env = "ONELOGIN_TIMEOUT")]
    timeout: Option<u64>,

    /// Page size for users and apps
    #[clap(long, env = "ONELOGIN_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Append log records to this file instead of stderr
    #[clap(long, env = "ONELOGIN_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Send log records to the local syslog daemon (Unix only)
    #[clap(long, env = "ONELOGIN_SYSLOG", conflicts_with = "log_file")]
    syslog: bool,

    /// error, warning, info or verbose
    #[clap(long, env = "ONELOGIN_LOG_LEVEL", default_value = "info")]
    log_level: Severity,

    #[clap(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let opt = Args::parse();

    let target = match opt.log_file {
        Some(path) => LogTarget::File(path),
        #[cfg(unix)]
        None if opt.syslog => LogTarget::Syslog,
        None => LogTarget::Console,
    };
    let log = build_logger(&target, opt.log_level).context("opening log")?;

    let mut config = Config::new(opt.base_url);
    config.timeout = opt.timeout.map(Duration::from_secs);
    config.user_page_size = opt.page_size;
    config.app_page_size = opt.page_size;

    let client = OneLogin::new(log, config).context("building http client")?;
    let credential =
        Credential::new(opt.client_id, Secret::new(opt.client_secret));

    let output = Runner::new(client, credential).run(opt.command)?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
