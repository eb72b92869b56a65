use std::fmt;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Unknown,
    Running,
    Exited,
    Paused,
    Restarting,
    NotFound,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RestartPolicy {
    None,
    Always,
    UnlessStopped,
    OnFailure,
}

/// Lifecycle snapshot of one monitored container.
#[derive(Clone, Debug)]
pub struct Record {
    pub name:          String,
    pub status:        Status,
    pub exit_code:     Option<i64>,
    pub policy:        RestartPolicy,
    pub restarts:      u64,
    pub last_stop_at:  Option<Instant>,
    pub last_start_at: Option<Instant>,
    pub pending:       bool,
    pub announced:     bool,
}

/// Point-in-time inspection read of a container that exists.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    pub status:    Status,
    pub policy:    RestartPolicy,
    pub restarts:  u64,
    pub exit_code: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NetworkSample {
    pub rx: u64,
    pub tx: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cause {
    Crashed,
    StoppedGracefully,
    Restarting,
    Started,
    Stopped,
}

impl Record {
    pub fn new(name: &str) -> Self {
        Self {
            name:          name.to_owned(),
            status:        Status::Unknown,
            exit_code:     None,
            policy:        RestartPolicy::None,
            restarts:      0,
            last_stop_at:  None,
            last_start_at: None,
            pending:       false,
            announced:     false,
        }
    }
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None          => "none",
            Self::Always        => "always",
            Self::UnlessStopped => "unless-stopped",
            Self::OnFailure     => "on-failure",
        }
    }
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown    => "unknown",
            Self::Running    => "running",
            Self::Exited     => "exited",
            Self::Paused     => "paused",
            Self::Restarting => "restarting",
            Self::NotFound   => "not_found",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Crashed           => "crashed",
            Self::StoppedGracefully => "stopped_gracefully",
            Self::Restarting        => "restarting",
            Self::Started           => "started",
            Self::Stopped           => "stopped",
        })
    }
}
