// src/main.rs
use std::sync::Arc;
use env_logger::Env;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use qlquery::config::Config;
use qlquery::gate::{CommandGate, Requester};
use qlquery::handlers::servers::{handle_servers, QuerySettings, Sinks};
use qlquery::output::ConsoleSink;
use dotenv;

fn parse_command(line: &str) -> Option<Requester> {
    match line.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["!servers"] => Some(Requester::Player),
        ["relay", "!servers"] => Some(Requester::Relay),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    dotenv::dotenv().ok();
    let config = Config::from_env();

    let gate = CommandGate::new(&config);
    let sinks = Sinks {
        private: Arc::new(ConsoleSink::new("private")),
        shared: Arc::new(ConsoleSink::new("chat")),
    };
    let settings = QuerySettings {
        timeout: config.query_timeout(),
        pacing: config.pacing(),
    };

    info!(
        "Ready with {} configured servers, show in chat: {}",
        config.servers.len(),
        config.show_in_chat
    );

    let mut pending = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_command(line) {
            Some(requester) => {
                if let Ok(handle) = handle_servers(&gate, requester, &sinks, settings) {
                    pending.push(handle);
                }
            }
            None => warn!("Ignoring unknown command: {}", line),
        }
    }

    for handle in pending {
        if let Err(e) = handle.await {
            warn!("Report task failed: {}", e);
        }
    }
    Ok(())
}
