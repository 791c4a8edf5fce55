// src/handlers/servers.rs
use std::sync::Arc;
use std::time::Duration;
use log::{debug, error};
use tokio::task::JoinHandle;
use crate::error::Denial;
use crate::gate::{CommandGate, Requester, Route};
use crate::output::OutputSink;
use crate::query::query_servers;
use crate::render::{deliver_paced, render_report, Pacing};

/// Where replies go: the requester alone or the shared channel.
#[derive(Clone)]
pub struct Sinks {
    pub private: Arc<dyn OutputSink>,
    pub shared: Arc<dyn OutputSink>,
}

impl Sinks {
    fn for_route(&self, route: Route) -> Arc<dyn OutputSink> {
        match route {
            Route::Private => Arc::clone(&self.private),
            Route::Broadcast => Arc::clone(&self.shared),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuerySettings {
    pub timeout: Duration,
    pub pacing: Pacing,
}

/// Runs the `!servers` command. Denials are told to the requester and
/// returned; otherwise the query runs in the background and its handle is
/// returned.
pub fn handle_servers(
    gate: &CommandGate,
    requester: Requester,
    sinks: &Sinks,
    settings: QuerySettings,
) -> Result<JoinHandle<()>, Denial> {
    let admission = match gate.admit(requester) {
        Ok(admission) => admission,
        Err(denial) => {
            sinks.private.deliver(&denial.to_string());
            return Err(denial);
        }
    };

    let sink = sinks.for_route(admission.route);
    Ok(tokio::spawn(async move {
        let reports = query_servers(&admission.servers, settings.timeout).await;
        match serde_json::to_string(&reports) {
            Ok(json) => debug!("Server reports: {}", json),
            Err(e) => error!("Failed to serialize server reports: {}", e),
        }

        let lines = render_report(&reports);
        deliver_paced(sink.as_ref(), &lines, settings.pacing).await;
    }))
}
