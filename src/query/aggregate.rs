// src/query/aggregate.rs
use std::time::Duration;
use log::{debug, warn};
use crate::error::QueryError;
use crate::models::server::{AggregateResult, ServerReport, ServerRules};
use crate::query::transport::{query_players, query_rules};
use crate::utils::QueryTarget;

/// Queries every address concurrently and returns one report per address,
/// in the order given. Failures are folded into error reports.
pub async fn query_servers(addresses: &[String], timeout: Duration) -> AggregateResult {
    let handles: Vec<_> = addresses
        .iter()
        .cloned()
        .map(|address| tokio::spawn(async move { query_server(&address, timeout).await }))
        .collect();

    let mut reports = Vec::with_capacity(addresses.len());
    for (address, handle) in addresses.iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(QueryError::Task(e.to_string())),
        };
        reports.push(result.unwrap_or_else(|e| {
            warn!("Query of {} failed: {}", address, e);
            ServerReport::failed(address, &e)
        }));
    }

    reports
}

/// Rules then players, each on its own socket.
pub async fn query_server(address: &str, timeout: Duration) -> Result<ServerReport, QueryError> {
    let target = QueryTarget::parse(address)?;

    let rules = query_rules(&target, timeout).await?.into_data();
    let server_rules = ServerRules::from_rules(&rules)?;
    let players = query_players(&target, timeout).await?.into_data();

    debug!(
        "{} answered: {} rules, {} players",
        target,
        rules.len(),
        players.len()
    );
    Ok(ServerReport::new(address, server_rules, players))
}
