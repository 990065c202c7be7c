// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Display Monitor - background task watching display topology
//!
//! Polls the display probe on a fixed interval. When the number of connected
//! displays changes to a non-zero count it pushes
//! `reapply rules for <n> displays` through the shared dispatcher, so
//! monitor-triggered work never overlaps IPC commands.
//! The first sample only establishes the baseline.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::dispatcher::{CommandOrigin, Dispatcher};
use crate::domain::daemon_config::DisplayMonitorConfig;
use crate::domain::executor::DisplayProbe;

pub struct DisplayMonitor {
    probe: Arc<dyn DisplayProbe>,
    dispatcher: Dispatcher,
    poll_interval: Duration,
    enabled: bool,
    shutdown_token: CancellationToken,
}

impl DisplayMonitor {
    pub fn new(
        probe: Arc<dyn DisplayProbe>,
        dispatcher: Dispatcher,
        config: &DisplayMonitorConfig,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            probe,
            dispatcher,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            enabled: config.enabled,
            shutdown_token,
        }
    }

    /// Override the poll interval (sub-second intervals are only useful in tests).
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(&self) {
        if !self.enabled {
            info!("Display monitor is disabled");
            return;
        }

        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Starting display monitor"
        );

        let mut tick = interval(self.poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<u32> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    last = self.poll(last).await;
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received, stopping display monitor");
                    break;
                }
            }
        }

        info!("Display monitor stopped");
    }

    /// Take one sample; returns the count to compare against next time.
    async fn poll(&self, last: Option<u32>) -> Option<u32> {
        let count = match self.probe.display_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "display probe failed");
                return last;
            }
        };

        match last {
            None => {
                debug!(displays = count, "initial display count");
            }
            Some(previous) if previous == count => {}
            Some(previous) if count == 0 => {
                info!(previous, "no displays connected, nothing to reapply");
            }
            Some(previous) => {
                info!(previous, displays = count, "display topology changed");
                let command = format!("reapply rules for {} displays", count);
                let result = self
                    .dispatcher
                    .dispatch(&command, CommandOrigin::DisplayMonitor)
                    .await;
                if !result.success {
                    warn!(message = %result.message, "reapplying display rules failed");
                }
            }
        }
        Some(count)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::application::command_processor::CommandService;
    use crate::domain::executor::ExecutorError;
    use crate::domain::result::CommandResult;

    /// Replays a scripted sequence of counts, repeating the last one.
    struct ScriptedProbe {
        counts: Mutex<VecDeque<Result<u32, ExecutorError>>>,
    }

    impl ScriptedProbe {
        fn new(counts: Vec<Result<u32, ExecutorError>>) -> Self {
            Self {
                counts: Mutex::new(counts.into()),
            }
        }
    }

    #[async_trait]
    impl DisplayProbe for ScriptedProbe {
        async fn display_count(&self) -> Result<u32, ExecutorError> {
            let mut counts = self.counts.lock();
            if counts.len() > 1 {
                counts.pop_front().unwrap()
            } else {
                counts.front().cloned().unwrap()
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandService for Recorder {
        async fn process(&self, input: &str) -> CommandResult {
            self.seen.lock().push(input.to_string());
            CommandResult::ok("done")
        }
    }

    async fn run_monitor(counts: Vec<Result<u32, ExecutorError>>) -> Vec<String> {
        let recorder = Arc::new(Recorder::default());
        let token = CancellationToken::new();
        let config = DisplayMonitorConfig {
            enabled: true,
            poll_interval_secs: 1,
        };
        let monitor = DisplayMonitor::new(
            Arc::new(ScriptedProbe::new(counts)),
            Dispatcher::new(recorder.clone()),
            &config,
            token.clone(),
        )
        .with_poll_interval(Duration::from_millis(5));

        let handle = monitor.start();
        tokio::time::sleep(Duration::from_millis(150)).await;
        token.cancel();
        handle.await.unwrap();

        let seen = recorder.seen.lock().clone();
        seen
    }

    #[tokio::test]
    async fn initial_sample_does_not_trigger() {
        assert!(run_monitor(vec![Ok(2)]).await.is_empty());
    }

    #[tokio::test]
    async fn each_change_triggers_one_reapply() {
        let seen = run_monitor(vec![Ok(1), Ok(1), Ok(3), Ok(3), Ok(1)]).await;
        assert_eq!(
            seen,
            vec![
                "reapply rules for 3 displays".to_string(),
                "reapply rules for 1 displays".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn zero_displays_update_baseline_without_reapply() {
        let seen = run_monitor(vec![Ok(2), Ok(0), Ok(0), Ok(2)]).await;
        assert_eq!(seen, vec!["reapply rules for 2 displays".to_string()]);
    }

    #[tokio::test]
    async fn probe_errors_keep_previous_baseline() {
        let seen = run_monitor(vec![
            Ok(2),
            Err(ExecutorError::Failed("probe offline".into())),
            Ok(2),
        ])
        .await;
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn disabled_monitor_exits_immediately() {
        let token = CancellationToken::new();
        let config = DisplayMonitorConfig {
            enabled: false,
            poll_interval_secs: 2,
        };
        let monitor = DisplayMonitor::new(
            Arc::new(ScriptedProbe::new(vec![Ok(1)])),
            Dispatcher::new(Arc::new(Recorder::default())),
            &config,
            token,
        );
        tokio::time::timeout(Duration::from_secs(1), monitor.start())
            .await
            .unwrap()
            .unwrap();
    }
}
