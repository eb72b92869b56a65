use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use log::{debug, info, warn};
use tokio::time::sleep;
use crate::board::Board;
use crate::data::Cause;
use crate::docker::Runtime;
use crate::event::{Action, Event, Kind};
use crate::message::Message;
use crate::sink::Notifier;
use crate::track::Tracker;

/// Turns runtime events for monitored containers into tracker updates
/// and notifications.
pub struct Dispatcher<R: ?Sized, N: ?Sized> {
    tracker:  Arc<Tracker>,
    runtime:  Arc<R>,
    notifier: Arc<N>,
    board:    Board,
    settle:   Duration,
    backoff:  Duration,
}

impl<R: Runtime + ?Sized, N: Notifier + ?Sized> Dispatcher<R, N> {
    pub fn new(tracker: Arc<Tracker>, runtime: Arc<R>, notifier: Arc<N>, settle: Duration) -> Self {
        let board   = Board::new();
        let backoff = crate::config::BACKOFF;
        Self { tracker, runtime, notifier, board, settle, backoff }
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Seed every record, announce the monitor and draw the first board.
    pub async fn start(&self) {
        for name in self.tracker.names() {
            self.refresh(name).await;
        }

        info!("monitoring {}", self.tracker.names().join(", "));

        self.notify(&Message::started(self.tracker.names())).await;
        self.board.refresh(&*self.notifier, &self.tracker.records()).await;
    }

    /// Consume runtime events from `since` until `shutdown` resolves. A
    /// stream that ends is reopened after the backoff, replaying from the
    /// moment it was lost, and every record is refreshed.
    pub async fn run<F>(&self, since: DateTime<Utc>, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut since = since;

        'outer: loop {
            let mut events = self.runtime.events(since);

            loop {
                let event = tokio::select! {
                    biased;
                    _     = &mut shutdown => break 'outer,
                    event = events.next() => event,
                };

                match event {
                    Some(Ok(event)) => self.handle(event).await,
                    Some(Err(e))    => warn!("event stream error: {:?}", e),
                    None            => break,
                }
            }

            since = Utc::now();
            warn!("event stream ended, reconnecting in {:?}", self.backoff);

            tokio::select! {
                biased;
                _ = &mut shutdown      => break 'outer,
                _ = sleep(self.backoff) => (),
            }

            for name in self.tracker.names() {
                self.refresh(name).await;
            }
            self.board.refresh(&*self.notifier, &self.tracker.records()).await;
        }

        info!("monitoring stopped");
        self.notify(&Message::stopped()).await;

        Ok(())
    }

    pub async fn handle(&self, event: Event) {
        if event.kind != Kind::Container {
            return;
        }

        let name = match event.name {
            Some(name) if self.tracker.contains(&name) => name,
            _                                          => return,
        };

        info!("{}: {}", name, event.action);

        match event.action {
            Action::Start => {
                self.tracker.record_start(&name);
                self.refresh(&name).await;
                self.report(&name, Cause::Started).await;
            }
            Action::Die => {
                self.tracker.record_stop(&name, event.exit_code);
                self.refresh(&name).await;
                sleep(self.settle).await;
                self.classify(&name).await;
            }
            Action::Stop => {
                self.refresh(&name).await;
                match self.tracker.get(&name) {
                    Some(r) if r.pending || r.announced => {
                        debug!("{}: stop already reported", name);
                    }
                    Some(_) => self.classify(&name).await,
                    None    => (),
                }
            }
            Action::Other(_) => self.refresh(&name).await,
        }

        self.board.refresh(&*self.notifier, &self.tracker.records()).await;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    async fn classify(&self, name: &str) {
        if let Some(cause) = self.tracker.classify(name) {
            info!("{}: {}", name, cause);
            self.report(name, cause).await;
            self.tracker.mark_announced(name);
        }
    }

    async fn refresh(&self, name: &str) {
        match self.runtime.inspect(name).await {
            Ok(snapshot) => self.tracker.apply_inspection(name, snapshot.as_ref()),
            Err(e)       => warn!("{}: inspection failed: {:?}", name, e),
        }
    }

    async fn report(&self, name: &str, cause: Cause) {
        if let Some(record) = self.tracker.get(name) {
            self.notify(&Message::report(cause, &record)).await;
        }
    }

    async fn notify(&self, message: &Message) {
        if let Err(e) = self.notifier.send(message).await {
            warn!("notification '{}' failed: {:?}", message.title, e);
        }
    }
}
