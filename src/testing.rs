use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use crate::data::{NetworkSample, Snapshot};
use crate::docker::Runtime;
use crate::event::Event;
use crate::message::Message;
use crate::sink::{MessageId, Notifier};

#[derive(Default)]
pub struct Recorder {
    sent:       Mutex<Vec<Message>>,
    edits:      Mutex<Vec<(MessageId, Message)>>,
    next:       AtomicU64,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
}

impl Recorder {
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().clone()
    }

    pub fn edits(&self) -> Vec<(MessageId, Message)> {
        self.edits.lock().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.title).collect()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for Recorder {
    async fn send(&self, message: &Message) -> Result<MessageId> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(anyhow!("send refused"));
        }
        self.sent.lock().push(message.clone());
        Ok(MessageId(self.next.fetch_add(1, Ordering::SeqCst).to_string()))
    }

    async fn edit(&self, id: &MessageId, message: &Message) -> Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(anyhow!("edit refused"));
        }
        self.edits.lock().push((id.clone(), message.clone()));
        Ok(())
    }
}

/// Runtime whose answers are set by the test. Unknown names are absent,
/// broken names fail every read. Each event subscription takes the next
/// queued batch and ends after it; with nothing queued it never yields.
#[derive(Default)]
pub struct FakeRuntime {
    snapshots: Mutex<HashMap<String, Snapshot>>,
    counters:  Mutex<HashMap<String, NetworkSample>>,
    broken:    Mutex<HashSet<String>>,
    streams:   Mutex<VecDeque<Vec<Result<Event>>>>,
    since:     Mutex<Vec<DateTime<Utc>>>,
}

impl FakeRuntime {
    pub fn set(&self, name: &str, snapshot: Snapshot) {
        self.snapshots.lock().insert(name.to_owned(), snapshot);
    }

    pub fn counters(&self, name: &str, rx: u64, tx: u64) {
        self.counters.lock().insert(name.to_owned(), NetworkSample { rx, tx });
    }

    pub fn break_reads(&self, name: &str) {
        self.broken.lock().insert(name.to_owned());
    }

    pub fn queue(&self, events: Vec<Result<Event>>) {
        self.streams.lock().push_back(events);
    }

    pub fn subscriptions(&self) -> Vec<DateTime<Utc>> {
        self.since.lock().clone()
    }

    fn check(&self, name: &str) -> Result<()> {
        match self.broken.lock().contains(name) {
            true  => Err(anyhow!("{} unreachable", name)),
            false => Ok(()),
        }
    }
}

#[async_trait]
impl Runtime for FakeRuntime {
    async fn inspect(&self, name: &str) -> Result<Option<Snapshot>> {
        self.check(name)?;
        Ok(self.snapshots.lock().get(name).cloned())
    }

    async fn network(&self, name: &str) -> Result<NetworkSample> {
        self.check(name)?;
        let counters = self.counters.lock().get(name).copied();
        counters.ok_or_else(|| anyhow!("no stats for {}", name))
    }

    fn events(&self, since: DateTime<Utc>) -> BoxStream<'static, Result<Event>> {
        self.since.lock().push(since);
        match self.streams.lock().pop_front() {
            Some(events) => stream::iter(events).boxed(),
            None         => stream::pending().boxed(),
        }
    }
}
