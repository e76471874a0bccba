//! Connection liveness monitor
//!
//! Periodically sweeps the connection table. Each sweep first checks the
//! alive flag: a connection that produced no traffic and answered no probe
//! since the previous sweep is force-closed, otherwise a ping probe is
//! queued. A connection that goes silent is therefore reaped within two
//! sweep intervals.

use crate::connection::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Background task that probes and reaps idle connections.
pub struct LivenessMonitor {
    connections: Arc<ConnectionManager>,
    interval: Duration,
}

impl LivenessMonitor {
    pub fn new(connections: Arc<ConnectionManager>, interval: Duration) -> Self {
        Self {
            connections,
            interval,
        }
    }

    /// Spawn the sweep loop. The task runs until the runtime shuts down.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so fresh
            // connections get one full interval before the first probe.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep();
            }
        })
    }

    /// One probe-or-reap pass over every connection.
    fn sweep(&self) {
        let connections = self.connections.all();
        tracing::trace!(count = connections.len(), "liveness sweep");

        for connection in connections {
            if connection.take_alive() {
                if !connection.probe() {
                    tracing::debug!(
                        connection = %connection.id(),
                        "probe not queued, connection closing"
                    );
                }
            } else {
                tracing::info!(
                    connection = %connection.id(),
                    age_secs = connection.age().as_secs(),
                    "closing unresponsive connection"
                );
                connection.request_close();
            }
        }
    }
}
