use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use chrono::Utc;
use env_logger::Builder;
use futures::future::pending;
use gumdrop::Options;
use log::{error, info, LevelFilter};
use tokio::signal::ctrl_c;
use tokio::sync::watch;
use dockwatch::config::Config;
use dockwatch::dispatch::Dispatcher;
use dockwatch::docker::DockerRuntime;
use dockwatch::sample::Sampler;
use dockwatch::sink::Sink;
use dockwatch::track::Tracker;

#[derive(Options)]
pub struct Args {
    #[options()]
    help: bool,
    #[options(help = "notification sink, e.g. discord,url=<webhook>")]
    sink: Option<Sink>,
    #[options(help = "seconds between network samples")]
    interval: Option<u64>,
    #[options(help = "network alert threshold in bytes")]
    threshold: Option<u64>,
    #[options(help = "restart detection window in seconds")]
    window: Option<u64>,
    #[options(help = "settle delay after a container dies, in millis")]
    settle: Option<u64>,
    #[options(help = "seconds to back off after a failed network poll")]
    backoff: Option<u64>,
    #[options(count)]
    verbose: u32,
    #[options(free)]
    containers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args_default_or_exit();
    let sink = args.sink.unwrap_or_default();

    let mut builder = Builder::from_default_env();
    builder.filter(None, match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
    builder.init();

    let mut config = Config::new(&args.containers)?;
    if let Some(secs) = args.interval {
        config.interval = Duration::from_secs(secs);
    }
    if let Some(bytes) = args.threshold {
        config.threshold = bytes;
    }
    if let Some(secs) = args.window {
        config.window = Duration::from_secs(secs);
    }
    if let Some(millis) = args.settle {
        config.settle = Duration::from_millis(millis);
    }
    if let Some(secs) = args.backoff {
        config.backoff = Duration::from_secs(secs);
    }

    sink.verify().await?;

    let runtime  = Arc::new(DockerRuntime::connect()?);
    let notifier = Arc::new(sink);
    let tracker  = Arc::new(Tracker::new(&config.containers, config.window));

    let dispatcher = Dispatcher::new(
        tracker.clone(),
        runtime.clone(),
        notifier.clone(),
        config.settle,
    ).backoff(config.backoff);

    let since = Utc::now();
    dispatcher.start().await;

    let sampler = Sampler::new(tracker, runtime.clone(), notifier)
        .interval(config.interval, config.backoff)
        .threshold(config.threshold);

    let (stop, stopped) = watch::channel(false);
    let sampler = tokio::spawn(sampler.run(stopped));

    let shutdown = async {
        if let Err(e) = ctrl_c().await {
            error!("signal handler failed: {:?}", e);
            pending::<()>().await;
        }
    };

    dispatcher.run(since, shutdown).await?;

    stop.send(true).ok();
    sampler.await?;

    info!("shutdown complete");

    Ok(())
}
