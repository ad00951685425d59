// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::OpenOptions;
use std::path::PathBuf;

use slog::Drain;
use slog::Level;
use slog::LevelFilter;
use slog::Logger;
use slog::o;

/// Where log records go
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LogTarget {
    /// Human-readable records on stderr
    #[default]
    Console,

    /// Plain records appended to a file
    File(PathBuf),

    /// The local syslog daemon, facility `user`
    #[cfg(unix)]
    Syslog,

    Discard,
}

/// The least severe records that still get written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    #[default]
    Info,
    Verbose,
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Level {
        match severity {
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warning,
            Severity::Info => Level::Info,
            Severity::Verbose => Level::Debug,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "verbose" | "debug" => Ok(Severity::Verbose),
            _ => Err(format!("{s} is not a log level")),
        }
    }
}

/// Build the logger handed to `OneLogin::new`.
pub fn build_logger(
    target: &LogTarget,
    severity: Severity,
) -> std::io::Result<Logger> {
    let level = Level::from(severity);

    let log = match target {
        LogTarget::Console => {
            let decorator = slog_term::TermDecorator::new().stderr().build();
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            async_root(drain, level)
        }

        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let decorator = slog_term::PlainDecorator::new(file);
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            async_root(drain, level)
        }

        #[cfg(unix)]
        LogTarget::Syslog => {
            let drain = slog_syslog::unix_3164(slog_syslog::Facility::LOG_USER)?
                .ignore_res();
            async_root(drain, level)
        }

        LogTarget::Discard => Logger::root(slog::Discard, o!()),
    };

    Ok(log)
}

fn async_root<D>(drain: D, level: Level) -> Logger
where
    D: Drain<Ok = (), Err = slog::Never> + Send + 'static,
{
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = LevelFilter::new(drain, level).fuse();
    Logger::root(drain, o!("component" => "onelogin"))
}
