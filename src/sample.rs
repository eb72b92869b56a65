use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::time::sleep;
use crate::data::{NetworkSample, Status};
use crate::docker::Runtime;
use crate::message::Message;
use crate::sink::Notifier;
use crate::track::Tracker;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alert {
    pub name:  String,
    pub delta: NetworkSample,
}

/// Polls network counters of running containers and reports large
/// jumps between consecutive polls.
pub struct Sampler<R: ?Sized, N: ?Sized> {
    tracker:   Arc<Tracker>,
    runtime:   Arc<R>,
    notifier:  Arc<N>,
    last:      HashMap<String, NetworkSample>,
    interval:  Duration,
    threshold: u64,
    backoff:   Duration,
}

impl<R: Runtime + ?Sized, N: Notifier + ?Sized> Sampler<R, N> {
    pub fn new(tracker: Arc<Tracker>, runtime: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            tracker:   tracker,
            runtime:   runtime,
            notifier:  notifier,
            last:      HashMap::new(),
            interval:  crate::config::INTERVAL,
            threshold: crate::config::THRESHOLD,
            backoff:   crate::config::BACKOFF,
        }
    }

    pub fn interval(mut self, interval: Duration, backoff: Duration) -> Self {
        self.interval = interval;
        self.backoff  = backoff;
        self
    }

    pub fn threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sample until `shutdown` flips to true or its sender goes away.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("network sampling every {:?}", self.interval);

        loop {
            let pause = match self.poll().await {
                Ok(alerts) => {
                    debug!("network poll raised {} alerts", alerts.len());
                    self.interval
                }
                Err(e) => {
                    error!("network poll failed: {:?}", e);
                    self.backoff
                }
            };

            tokio::select! {
                _ = sleep(pause) => (),
                _ = stopped(&mut shutdown) => break,
            }
        }

        debug!("network sampler finished");
    }

    /// One pass over every running container. Fails only when every
    /// attempted read failed.
    pub async fn poll(&mut self) -> Result<Vec<Alert>> {
        let mut alerts = Vec::new();
        let mut tried  = 0;
        let mut failed = 0;

        for name in self.tracker.names().to_vec() {
            if self.tracker.status(&name) != Some(Status::Running) {
                self.last.remove(&name);
                continue;
            }

            tried += 1;

            let sample = match self.runtime.network(&name).await {
                Ok(sample) => sample,
                Err(e)     => {
                    warn!("{}: network read failed: {:?}", name, e);
                    failed += 1;
                    continue;
                }
            };

            if let Some(alert) = self.observe(&name, sample) {
                let message = Message::throughput(&name, alert.delta);
                if let Err(e) = self.notifier.send(&message).await {
                    warn!("{}: throughput alert not sent: {:?}", name, e);
                }
                alerts.push(alert);
            }
        }

        match tried > 0 && tried == failed {
            true  => Err(anyhow!("all {} network reads failed", failed)),
            false => Ok(alerts),
        }
    }

    fn observe(&mut self, name: &str, sample: NetworkSample) -> Option<Alert> {
        let prev = self.last.insert(name.to_owned(), sample)?;

        let delta = NetworkSample {
            rx: sample.rx.saturating_sub(prev.rx),
            tx: sample.tx.saturating_sub(prev.tx),
        };

        if delta.rx.saturating_add(delta.tx) <= self.threshold {
            return None;
        }

        info!("{}: network jump rx {} tx {}", name, delta.rx, delta.tx);

        Some(Alert {
            name:  name.to_owned(),
            delta: delta,
        })
    }
}

async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
