// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Periodic record refresh.

use crate::demo::Sample;
use schemawire::{Publish, SchemaVersion, SnapshotPublisher, WireError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running refresh task.
pub struct RefreshHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stop the task and wait for it to exit.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!("refresh task ended abnormally: {}", e);
        }
    }
}

/// Build the publisher for `T`, seed it with a first record and start
/// refreshing it every `interval`.
pub fn start<T: Sample>(
    interval: Duration,
) -> Result<(Arc<SnapshotPublisher<T>>, RefreshHandle), WireError> {
    let schema = Arc::new(SchemaVersion::of::<T>(T::LABEL)?);
    let mut rng = fastrand::Rng::new();
    let publisher = Arc::new(SnapshotPublisher::new(schema, T::refresh(&mut rng)));
    let handle = spawn(Arc::clone(&publisher), interval, rng);
    Ok((publisher, handle))
}

/// Type-erased variant of [`start`] for callers that pick the record at
/// runtime.
pub fn start_dyn<T: Sample>(
    interval: Duration,
) -> Result<(Arc<dyn Publish>, RefreshHandle), WireError> {
    let (publisher, handle) = start::<T>(interval)?;
    let publisher: Arc<dyn Publish> = publisher;
    Ok((publisher, handle))
}

fn spawn<T: Sample>(
    publisher: Arc<SnapshotPublisher<T>>,
    interval: Duration,
    mut rng: fastrand::Rng,
) -> RefreshHandle {
    let (stop, mut stopped) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the seed record covers it.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    publisher.publish(T::refresh(&mut rng));
                }
                changed = stopped.changed() => {
                    if changed.is_err() || *stopped.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("refresh task for {} stopped", T::LABEL);
    });
    RefreshHandle { stop, task }
}
