// src/models/server.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::QueryError;

/// Key/value pairs decoded from a rules reply.
pub type RuleSet = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub score: i32,
    /// Connection time in seconds.
    pub duration: f32,
}

/// Fields the report needs out of a rules reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRules {
    pub host_name: String,
    pub map_name: String,
    pub max_players: u32,
    pub game_state: String,
}

impl ServerRules {
    pub fn from_rules(rules: &RuleSet) -> Result<Self, QueryError> {
        let max_players: u32 = match rules.get("sv_maxclients") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| QueryError::InvalidMaxClients(raw.clone()))?,
            None => 0,
        };

        Ok(Self {
            host_name: rule_or(rules, "sv_hostname", "unknown"),
            map_name: rule_or(rules, "mapname", "unknown"),
            max_players,
            game_state: rule_or(rules, "g_gameState", "-"),
        })
    }
}

fn rule_or(rules: &RuleSet, key: &str, default: &str) -> String {
    rules.get(key).cloned().unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerReport {
    pub address: String,
    pub host_name: String,
    pub map_name: String,
    pub players: usize,
    pub max_players: u32,
    pub game_state: String,
    pub player_list: Vec<PlayerRecord>,
    pub error: Option<String>,
}

impl ServerReport {
    pub fn new(address: &str, rules: ServerRules, player_list: Vec<PlayerRecord>) -> Self {
        Self {
            address: address.to_string(),
            host_name: rules.host_name,
            map_name: rules.map_name,
            players: player_list.len(),
            max_players: rules.max_players,
            game_state: rules.game_state,
            player_list,
            error: None,
        }
    }

    pub fn failed(address: &str, err: &QueryError) -> Self {
        Self {
            address: address.to_string(),
            host_name: format!("Error: {}", err),
            map_name: "-".to_string(),
            players: 0,
            max_players: 0,
            game_state: "-".to_string(),
            player_list: Vec::new(),
            error: Some(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One report per requested address, in request order.
pub type AggregateResult = Vec<ServerReport>;
