// src/pipeline/sink.rs
// =============================================================================
// Collects outcomes as they complete and hands them to the reporter.
//
// - Producers (probe tasks, the line parser) get a cheap `SinkHandle` clone
//   and push into an unbounded channel; sending never waits.
// - One consumer task owns the reporter, forwards each outcome in the order
//   it arrived, and keeps the running summary.
// - The consumer stops when every handle is dropped, then returns the summary.
//
// Nothing is shared between producers except the channel itself.
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::probe::{Outcome, OutcomeKind};

/// Receives outcomes one at a time, in completion order.
///
/// `Send` is required because the reporter is moved into the consumer task,
/// which may run on any runtime thread.
pub trait Reporter: Send {
    fn report(&mut self, outcome: &Outcome);

    /// Called once after the last outcome.
    fn finish(&mut self, _summary: &Summary) {}
}

// Counts per outcome kind for one run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub alive: usize,
    pub success: usize,
    pub error: usize,
    pub timeout: usize,
    pub invalid_method: usize,
    pub invalid_url: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        // Alive is derived, so it is counted separately from the kind
        if outcome.is_alive() {
            self.alive += 1;
        }
        match outcome.kind {
            OutcomeKind::Success => self.success += 1,
            OutcomeKind::Error => self.error += 1,
            OutcomeKind::Timeout => self.timeout += 1,
            OutcomeKind::InvalidMethod => self.invalid_method += 1,
            OutcomeKind::InvalidUrl => self.invalid_url += 1,
        }
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        match kind {
            OutcomeKind::Success => self.success,
            OutcomeKind::Error => self.error,
            OutcomeKind::Timeout => self.timeout,
            OutcomeKind::InvalidMethod => self.invalid_method,
            OutcomeKind::InvalidUrl => self.invalid_url,
        }
    }

    // Failures of any kind plus responses with a 4xx/5xx code
    pub fn not_alive(&self) -> usize {
        self.total - self.alive
    }
}

/// Producer side of the sink.
#[derive(Clone)]
pub struct SinkHandle {
    tx: mpsc::UnboundedSender<Outcome>,
}

impl SinkHandle {
    pub fn send(&self, outcome: Outcome) {
        // Only fails if the consumer task died, which means it panicked
        if let Err(e) = self.tx.send(outcome) {
            log::error!("Result sink is gone, dropping outcome for {}", e.0.url);
        }
    }
}

pub struct ResultSink {
    handle: SinkHandle,
    consumer: JoinHandle<Summary>,
}

impl ResultSink {
    pub fn spawn(mut reporter: Box<dyn Reporter>) -> Self {
        // Unbounded: a probe task never waits on a slow reporter
        let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();

        let consumer = tokio::spawn(async move {
            let mut summary = Summary::default();
            // recv() returns None once every sender has been dropped
            while let Some(outcome) = rx.recv().await {
                summary.record(&outcome);
                reporter.report(&outcome);
            }
            reporter.finish(&summary);
            summary
        });

        Self {
            handle: SinkHandle { tx },
            consumer,
        }
    }

    pub fn handle(&self) -> SinkHandle {
        self.handle.clone()
    }

    /// Closes this sink's own handle and waits for the consumer to drain.
    ///
    /// Every other `SinkHandle` must already be dropped, or this waits forever.
    pub async fn finish(self) -> Result<Summary> {
        drop(self.handle);
        self.consumer.await.context("result sink task failed")
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is an mpsc channel?
//    - "multi-producer, single-consumer": many senders, one receiver
//    - Senders can be cloned and moved into different tasks
//    - Values arrive at the receiver in the order they were sent
//
// 2. Why a channel instead of a shared Vec behind a Mutex?
//    - The probe tasks never touch each other's data
//    - Only the consumer task owns the reporter and the summary, so they
//      need no locking at all
//
// 3. What is Box<dyn Reporter>?
//    - A trait object: "some type that implements Reporter"
//    - Lets the caller pick text, JSON, or a test collector at runtime
// -----------------------------------------------------------------------------
