// src/probe/limiter.rs
// =============================================================================
// Bounds how many probe tasks run at the same time.
//
// How it works:
// - A fair tokio Semaphore with `max` permits is the admission gate. Waiters
//   are queued FIFO, so tasks are admitted in the order they were submitted.
// - Each admitted task owns its permit plus an in-flight guard. Both are
//   dropped when the task ends, however it ends (finished, timed out,
//   panicked, aborted), so a slot can never leak.
// - The in-flight counter is bumped after the permit is acquired and dropped
//   before the permit is released, so `in_flight <= max` always holds.
//
// Rust concepts:
// - RAII guards: cleanup lives in Drop, not in every exit path
// - JoinSet: owns the spawned tasks so we can wait for all of them
// - Atomics: the only state shared between concurrent tasks
// =============================================================================

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

// Marks one task as in flight for as long as it is alive
struct InFlightGuard(Arc<Counters>);

impl InFlightGuard {
    fn enter(counters: Arc<Counters>) -> Self {
        let now = counters.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        counters.peak.fetch_max(now, Ordering::AcqRel);
        Self(counters)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct Limiter {
    semaphore: Arc<Semaphore>,
    counters: Arc<Counters>,
    max: usize,
    tasks: JoinSet<()>,
}

impl Limiter {
    /// Creates a limiter admitting at most `max` tasks at once (at least one).
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            counters: Arc::new(Counters::default()),
            max,
            tasks: JoinSet::new(),
        }
    }

    /// Waits for a free slot, then spawns `task` in it.
    ///
    /// Returns once the task has been admitted, not when it finishes.
    pub async fn submit<F>(&mut self, task: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Reap whatever already finished so the set doesn't grow with the input
        while let Some(result) = self.tasks.try_join_next() {
            log_join_result(result);
        }

        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .context("concurrency limiter was closed")?;
        let guard = InFlightGuard::enter(self.counters.clone());

        log::debug!(
            "Admitted task ({}/{} in flight)",
            self.counters.in_flight.load(Ordering::Acquire),
            self.max
        );

        self.tasks.spawn(async move {
            // Locals drop in reverse: the guard goes before the permit
            let _permit = permit;
            let _guard = guard;
            task.await;
        });
        Ok(())
    }

    /// Waits until every submitted task has finished.
    pub async fn wait_idle(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            log_join_result(result);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::Acquire)
    }

    /// Highest number of tasks that were ever in flight together.
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::Acquire)
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

fn log_join_result(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            log::error!("Probe task panicked: {}", e);
        } else {
            log::warn!("Probe task was cancelled: {}", e);
        }
    }
}
