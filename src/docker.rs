use std::collections::HashMap;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{InspectContainerOptions, StatsOptions};
use bollard::errors::Error as DockerError;
use bollard::models::{ContainerStateStatusEnum, RestartPolicyNameEnum};
use bollard::system::EventsOptions;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use crate::data::{NetworkSample, RestartPolicy, Snapshot, Status};
use crate::event::Event;

/// Container runtime as seen by the monitor.
#[async_trait]
pub trait Runtime: Send + Sync {
    /// `None` when the runtime has no container by that name.
    async fn inspect(&self, name: &str) -> Result<Option<Snapshot>>;

    /// Cumulative byte counters summed over all interfaces.
    async fn network(&self, name: &str) -> Result<NetworkSample>;

    /// Container events from `since` onwards; ends when the connection drops.
    fn events(&self, since: DateTime<Utc>) -> BoxStream<'static, Result<Event>>;
}

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    pub fn connect() -> Result<Self> {
        Ok(Self::new(Docker::connect_with_local_defaults()?))
    }
}

#[async_trait]
impl Runtime for DockerRuntime {
    async fn inspect(&self, name: &str) -> Result<Option<Snapshot>> {
        let opts = None::<InspectContainerOptions>;
        let details = match self.docker.inspect_container(name, opts).await {
            Ok(details) => details,
            Err(DockerError::DockerResponseServerError { status_code: 404, .. }) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let state  = details.state.unwrap_or_default();
        let status = status(state.status);
        let policy = details.host_config.and_then(|c| c.restart_policy);
        let policy = policy.and_then(|p| p.name).map(restart_policy);

        let exit_code = match status {
            Status::Exited => state.exit_code,
            _              => None,
        };

        Ok(Some(Snapshot {
            status:    status,
            policy:    policy.unwrap_or(RestartPolicy::None),
            restarts:  details.restart_count.unwrap_or(0).max(0) as u64,
            exit_code: exit_code,
        }))
    }

    async fn network(&self, name: &str) -> Result<NetworkSample> {
        let opts = StatsOptions {
            stream:   false,
            one_shot: true,
        };

        let mut stats = Box::pin(self.docker.stats(name, Some(opts)));
        let stats = match stats.next().await {
            Some(stats) => stats?,
            None        => return Err(anyhow!("no stats for {}", name)),
        };

        let sample = stats.networks.unwrap_or_default().values().fold(
            NetworkSample::default(),
            |sum, net| NetworkSample {
                rx: sum.rx + net.rx_bytes,
                tx: sum.tx + net.tx_bytes,
            },
        );

        Ok(sample)
    }

    fn events(&self, since: DateTime<Utc>) -> BoxStream<'static, Result<Event>> {
        let mut filters = HashMap::new();
        filters.insert("type".to_owned(), vec!["container".to_owned()]);

        let opts = EventsOptions::<String> {
            since:   Some(since),
            filters: filters,
            ..Default::default()
        };

        self.docker.events(Some(opts)).map(|event| -> Result<Event> {
            Ok(Event::from(event?))
        }).boxed()
    }
}

fn status(status: Option<ContainerStateStatusEnum>) -> Status {
    match status {
        Some(ContainerStateStatusEnum::RUNNING)    => Status::Running,
        Some(ContainerStateStatusEnum::EXITED)     => Status::Exited,
        Some(ContainerStateStatusEnum::DEAD)       => Status::Exited,
        Some(ContainerStateStatusEnum::PAUSED)     => Status::Paused,
        Some(ContainerStateStatusEnum::RESTARTING) => Status::Restarting,
        _                                          => Status::Unknown,
    }
}

fn restart_policy(name: RestartPolicyNameEnum) -> RestartPolicy {
    match name {
        RestartPolicyNameEnum::ALWAYS         => RestartPolicy::Always,
        RestartPolicyNameEnum::UNLESS_STOPPED => RestartPolicy::UnlessStopped,
        RestartPolicyNameEnum::ON_FAILURE     => RestartPolicy::OnFailure,
        _                                     => RestartPolicy::None,
    }
}
