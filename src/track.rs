use std::collections::HashMap;
use std::time::Duration;
use log::debug;
use parking_lot::RwLock;
use tokio::time::Instant;
use crate::classify::{classify, expects_restart};
use crate::data::{Cause, Record, RestartPolicy, Snapshot, Status};

/// Owns one record per monitored container. The key set is fixed at
/// construction; every operation on an unknown name is a no-op.
pub struct Tracker {
    names:  Vec<String>,
    table:  RwLock<HashMap<String, Record>>,
    window: Duration,
}

impl Tracker {
    pub fn new<S: AsRef<str>>(names: &[S], window: Duration) -> Self {
        let names = names.iter().map(|n| n.as_ref().to_owned()).collect::<Vec<_>>();
        let table = names.iter().map(|n| {
            (n.clone(), Record::new(n))
        }).collect::<HashMap<_, _>>();
        let table = RwLock::new(table);
        Self { names, table, window }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.read().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Record> {
        self.table.read().get(name).cloned()
    }

    pub fn status(&self, name: &str) -> Option<Status> {
        self.table.read().get(name).map(|r| r.status)
    }

    /// Copies of every record in configured order.
    pub fn records(&self) -> Vec<Record> {
        let table = self.table.read();
        self.names.iter().filter_map(|n| table.get(n).cloned()).collect()
    }

    pub fn apply_inspection(&self, name: &str, snapshot: Option<&Snapshot>) {
        self.modify(name, |record| {
            let snapshot = match snapshot {
                Some(snapshot) => snapshot,
                None           => {
                    record.status = Status::NotFound;
                    return;
                }
            };

            record.status   = snapshot.status;
            record.policy   = snapshot.policy;
            record.restarts = snapshot.restarts;

            match snapshot.status {
                Status::Exited  => {
                    if let Some(code) = snapshot.exit_code {
                        record.exit_code = Some(code);
                    }
                }
                Status::Running => record.exit_code = None,
                _               => (),
            }

            if snapshot.policy == RestartPolicy::None {
                record.pending = false;
            }
        });
    }

    pub fn record_start(&self, name: &str) {
        self.modify(name, |record| {
            record.last_start_at = Some(Instant::now());
            record.pending       = false;
            record.announced     = false;
            record.exit_code     = None;
        });
    }

    pub fn record_stop(&self, name: &str, exit_code: Option<i64>) {
        self.modify(name, |record| {
            record.last_stop_at = Some(Instant::now());
            record.announced    = false;
            if exit_code.is_some() {
                record.exit_code = exit_code;
            }
            record.pending = expects_restart(record.policy, exit_code);
            debug!("{}: stop {:?}, pending restart {}", name, exit_code, record.pending);
        });
    }

    /// Remember that the current stop transition has been reported.
    pub fn mark_announced(&self, name: &str) {
        self.modify(name, |record| record.announced = true);
    }

    pub fn classify(&self, name: &str) -> Option<Cause> {
        let table = self.table.read();
        let record = table.get(name)?;
        Some(classify(record, Instant::now(), self.window))
    }

    fn modify<F: FnOnce(&mut Record)>(&self, name: &str, f: F) {
        if let Some(record) = self.table.write().get_mut(name) {
            f(record);
        }
    }
}
