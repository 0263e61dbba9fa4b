// src/probe/executor.rs
// =============================================================================
// Performs one HTTP request per target under a hard deadline.
//
// The race:
// - the request runs in its own task
// - a deadline timer runs in another task
// - both try to settle the same one-shot slot; an atomic flag decides who
//   wins, the loser's result is dropped
// - when the timer wins it aborts the request task, which drops the
//   connection
//
// Classification:
// - response (any status)     -> Success, with status code and Location
// - transport failure         -> Error, with the error chain as detail
// - deadline hit first        -> Timeout
// - URL doesn't parse/no host -> InvalidUrl, no request is sent
//
// Redirects are NOT followed: a 301 is reported as a 301 with its Location.
// There are no retries.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::{header, Client, Response};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use url::Url;

use super::Outcome;
use crate::config::ProbeConfig;
use crate::target::Target;

// Single-resolution slot: the first `resolve` call wins, later ones are ignored
struct Settle {
    settled: AtomicBool,
    tx: Mutex<Option<oneshot::Sender<Outcome>>>,
}

impl Settle {
    fn new(tx: oneshot::Sender<Outcome>) -> Self {
        Self {
            settled: AtomicBool::new(false),
            tx: Mutex::new(Some(tx)),
        }
    }

    // Returns false if someone else already settled the slot
    fn resolve(&self, outcome: Outcome) -> bool {
        if self
            .settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let sender = match self.tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(tx) = sender {
            // The receiver is gone only if the probe itself was dropped
            let _ = tx.send(outcome);
        }
        true
    }
}

// Aborts the spawned request and timer tasks when the probe is done or dropped
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Sends probe requests. Cheap to clone: the HTTP client is shared.
#[derive(Clone)]
pub struct Prober {
    client: Client,
    timeout: Duration,
}

impl Prober {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        // No client-level timeout: the deadline is enforced by the race below
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout: config.request_timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probes one target and resolves to exactly one outcome.
    pub async fn probe(&self, target: Target) -> Outcome {
        let url = match parse_target_url(target.url()) {
            Ok(url) => url,
            Err(detail) => {
                log::warn!("Invalid URL: {}, error: {}", target.url(), detail);
                return Outcome::invalid_url(target.url(), target.method().as_str(), detail);
            }
        };

        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Settle::new(tx));
        let target = Arc::new(target);

        let request = {
            let slot = slot.clone();
            let target = target.clone();
            let request = self.client.request(target.method().to_reqwest(), url);
            tokio::spawn(async move {
                let outcome = match request.send().await {
                    Ok(response) => analyze_response(&target, &response),
                    Err(e) => categorize_error(&target, &e),
                };
                if !slot.resolve(outcome) {
                    log::debug!("Discarding late result for {}", target);
                }
            })
        };

        let deadline = {
            let slot = slot.clone();
            let target = target.clone();
            let cancel = request.abort_handle();
            let timeout = self.timeout;
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let outcome = Outcome::timeout(
                    &target,
                    format!("request timed out after {} ms", timeout.as_millis()),
                );
                if slot.resolve(outcome) {
                    cancel.abort();
                    log::warn!("Request to {} timed out", target.url());
                }
            })
        };

        let _cleanup = AbortOnDrop(vec![request.abort_handle(), deadline.abort_handle()]);

        match rx.await {
            Ok(outcome) => outcome,
            // Both tasks ended without settling, e.g. the request task panicked
            // and the runtime is shutting down
            Err(_) => Outcome::error(&target, "probe ended without a result".to_string()),
        }
    }
}

// Full URL parse, deferred from line parsing; also requires a host
fn parse_target_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err("URL has no host".to_string()),
    }
}

// Any response counts as Success; aliveness is derived from the code later
fn analyze_response(target: &Target, response: &Response) -> Outcome {
    let status = response.status().as_u16();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    log::info!(
        "Processed {} -> status {}{}",
        target,
        status,
        location
            .as_deref()
            .map(|l| format!(", redirected to {}", l))
            .unwrap_or_default()
    );

    Outcome::success(target, status, location)
}

// Transport failures, tagged with a rough category and the full cause chain
fn categorize_error(target: &Target, error: &reqwest::Error) -> Outcome {
    let category = if error.is_connect() {
        "connection failed"
    } else if error.is_redirect() {
        "redirect error"
    } else if error.is_request() {
        "request failed"
    } else {
        "request error"
    };

    let detail = format!("{}: {}", category, error_chain(error));
    log::warn!("Request error for {}: {}", target, detail);
    Outcome::error(target, detail)
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        // hyper and reqwest often repeat the inner message in the outer one
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does compare_exchange do?
//    - Atomically: "if the flag is still false, set it to true"
//    - Exactly one caller sees Ok, every other caller sees Err
//    - That single Ok is what makes the outcome exactly-once
//
// 2. Why tokio::spawn for the request instead of just awaiting it?
//    - A spawned task can be cancelled from the outside via its AbortHandle
//    - Aborting drops the request future, and with it the socket
//
// 3. What happens to a response that arrives after the deadline?
//    - Usually nothing: the task was aborted before it could finish
//    - If it finished anyway, resolve() returns false and the result is dropped
// -----------------------------------------------------------------------------
