// src/error.rs
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure while querying a single server. Never fatal to a batch; the
/// aggregator turns it into an error-flagged report.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid address '{0}', expected host:port")]
    InvalidAddress(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("could not resolve {0}")]
    Unresolved(String),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("invalid sv_maxclients '{0}'")]
    InvalidMaxClients(String),
    #[error("query task failed: {0}")]
    Task(String),
}

/// Reasons the command gate refuses to run a query.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Denial {
    #[error("^7!servers cooldown: {:.1}s", .remaining.as_secs_f64())]
    Cooldown { remaining: Duration },
    #[error("QLX_SERVERS is not set.")]
    NotConfigured,
    #[error("QLX_SERVERS has an invalid server (empty string).")]
    BlankEntry,
}
