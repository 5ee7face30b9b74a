use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// One unit of periodic work driven by [`CollectLoop`]
#[async_trait]
pub trait Collector: Send + 'static {
    async fn collect(&mut self);
}

pub struct CollectLoopHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CollectLoopHandle {
    /// Stops scheduling new cycles. A cycle already running
    /// is allowed to finish.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Waits for the loop task to exit
    pub async fn join(self) -> Result<()> {
        self.task.await.context("Collect loop task failed")
    }
}

/// Runs a [`Collector`] once immediately, then every period,
/// on its own task. Cycles never overlap; a cycle that runs
/// past its period delays the next tick instead of bunching.
pub struct CollectLoop<C> {
    collector: C,
    period: Duration,
}

impl<C: Collector> CollectLoop<C> {
    pub fn new(collector: C, period: Duration) -> Result<Self> {
        if period.is_zero() {
            bail!("Collect period must be greater than zero");
        }

        Ok(Self { collector, period })
    }

    pub fn start(self) -> CollectLoopHandle {
        let (shutdown, mut stopped) = watch::channel(false);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut collector = self.collector;
        let period = self.period;

        let task = tokio::spawn(async move {
            info!("Collect loop started, period {:?}", period);

            loop {
                tokio::select! {
                    biased;
                    // also fires if the handle was dropped
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {}
                }

                collector.collect().await;

                if *stopped.borrow() {
                    break;
                }
            }

            debug!("Collect loop exiting");
        });

        CollectLoopHandle { shutdown, task }
    }
}
