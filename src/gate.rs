// src/gate.rs
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::RateLimiter;
use log::{debug, info};
use crate::config::Config;
use crate::error::Denial;

type CooldownLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Who asked for the server list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requester {
    /// A player in the game.
    Player,
    /// A bridged relay such as IRC; replies always go to the shared channel.
    Relay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Reply only to the requester. Not subject to the cooldown.
    Private,
    /// Reply to the shared channel.
    Broadcast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub route: Route,
    pub servers: Vec<String>,
}

/// Validates configuration and owns the broadcast cooldown. Only the
/// broadcast path reads or advances the cooldown.
pub struct CommandGate {
    servers: Vec<String>,
    show_in_chat: bool,
    cooldown: Option<CooldownLimiter>,
    clock: DefaultClock,
}

impl CommandGate {
    pub fn new(config: &Config) -> Self {
        let clock = DefaultClock::default();
        let cooldown = config
            .cooldown_quota()
            .map(|quota| RateLimiter::direct_with_clock(quota, &clock));

        Self {
            servers: config.servers.clone(),
            show_in_chat: config.show_in_chat,
            cooldown,
            clock,
        }
    }

    pub fn route_for(&self, requester: Requester) -> Route {
        if !self.show_in_chat && requester == Requester::Player {
            Route::Private
        } else {
            Route::Broadcast
        }
    }

    pub fn admit(&self, requester: Requester) -> Result<Admission, Denial> {
        validate_servers(&self.servers)?;

        let route = self.route_for(requester);
        if route == Route::Broadcast {
            self.check_cooldown()?;
        }

        info!("Querying {} servers for {:?} ({:?})", self.servers.len(), requester, route);
        Ok(Admission {
            route,
            servers: self.servers.clone(),
        })
    }

    fn check_cooldown(&self) -> Result<(), Denial> {
        let Some(limiter) = &self.cooldown else {
            return Ok(());
        };
        limiter.check().map_err(|not_until| {
            let remaining = not_until.wait_time_from(self.clock.now());
            debug!("Broadcast refused, {:?} of cooldown left", remaining);
            Denial::Cooldown { remaining }
        })
    }
}

pub fn validate_servers(servers: &[String]) -> Result<(), Denial> {
    if servers.is_empty() || (servers.len() == 1 && servers[0].is_empty()) {
        return Err(Denial::NotConfigured);
    }
    if servers.iter().any(|s| s.trim().is_empty()) {
        return Err(Denial::BlankEntry);
    }
    Ok(())
}
