// src/pipeline/driver.rs
// =============================================================================
// Drives a whole run: lines in, outcomes out.
//
// For every input line:
// 1. parse it (skip / reject / target)
// 2. rejected lines go straight to the result sink
// 3. targets are submitted to the limiter, which runs the probe once a slot
//    is free; the probe's outcome is sent to the sink from inside the task
//
// The run is finished only when the input is exhausted, every submitted
// probe has completed, and the sink has forwarded the last outcome.
//
// Lines that aren't valid UTF-8 are decoded lossily and processed like any
// other line. A real read error on the input stops new submissions, but the
// probes already in flight still finish and get reported before the error
// is returned.
// =============================================================================

use anyhow::{Context, Result};
use futures::stream::{self, Stream, StreamExt};
use std::borrow::Cow;
use std::io;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::sink::{Reporter, ResultSink, Summary};
use crate::config::ProbeConfig;
use crate::probe::{Limiter, Prober};
use crate::target::{parse_line, ParsedLine};

// What a completed run hands back to its caller
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: Summary,
    /// Most probes that were ever in flight together
    pub peak_in_flight: usize,
}

/// Turns any async buffered reader into a stream of lines.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD instead of failing,
/// so one badly encoded line only affects itself. Real I/O errors still end
/// the stream.
pub fn read_lines<R>(reader: R) -> impl Stream<Item = io::Result<String>>
where
    R: AsyncBufRead + Unpin,
{
    // The state is the reader; None once an I/O error was yielded
    stream::unfold(Some(reader), |state| async move {
        let mut reader = state?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            // 0 bytes read means end of input
            Ok(0) => None,
            Ok(_) => {
                // Strip "\n" or "\r\n", like AsyncBufReadExt::lines does
                if buf.ends_with(b"\n") {
                    buf.pop();
                    if buf.ends_with(b"\r") {
                        buf.pop();
                    }
                }
                let line = match String::from_utf8_lossy(&buf) {
                    Cow::Borrowed(line) => line.to_string(),
                    Cow::Owned(line) => {
                        log::warn!("Input line is not valid UTF-8, decoded as: {}", line);
                        line
                    }
                };
                Some((Ok(line), Some(reader)))
            }
            // Yield the error once, then end the stream
            Err(e) => Some((Err(e), None)),
        }
    })
}

/// Probes every target listed in `config.input`.
pub async fn run_file(config: &ProbeConfig, reporter: Box<dyn Reporter>) -> Result<RunReport> {
    let file = File::open(&config.input)
        .await
        .with_context(|| format!("failed to open input file {}", config.input.display()))?;

    log::info!("Reading targets from {}", config.input.display());
    let lines = Box::pin(read_lines(BufReader::new(file)));
    run_lines(lines, config, reporter).await
}

/// Probes every target in `lines` and reports each outcome as it completes.
pub async fn run_lines<S>(
    mut lines: S,
    config: &ProbeConfig,
    reporter: Box<dyn Reporter>,
) -> Result<RunReport>
where
    S: Stream<Item = io::Result<String>> + Unpin,
{
    // Fatal setup errors happen before anything is spawned
    config.validate()?;
    let prober = Prober::new(config)?;
    let mut limiter = Limiter::new(config.max_concurrency);
    // The sink's consumer task starts right away, so outcomes are reported
    // while later lines are still being read
    let sink = ResultSink::spawn(reporter);
    let results = sink.handle();

    log::debug!(
        "Starting run: max {} concurrent probes, {} ms timeout",
        limiter.max(),
        prober.timeout().as_millis()
    );

    // First fatal error, returned only after everything in flight is drained
    let mut fatal = None;
    let mut line_number = 0usize;

    while let Some(line) = lines.next().await {
        line_number += 1;
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                let e = anyhow::Error::new(e)
                    .context(format!("failed to read input line {}", line_number));
                fatal = Some(e);
                break;
            }
        };

        match parse_line(&line) {
            ParsedLine::Skip => {}
            ParsedLine::Rejected(outcome) => results.send(outcome),
            ParsedLine::Target(target) => {
                // Each task gets its own clones; both are cheap (Arc inside)
                let prober = prober.clone();
                let results = results.clone();
                // Waits here until a slot is free, which keeps admission in
                // input order and stops us reading far ahead of the probes
                let submitted = limiter
                    .submit(async move {
                        let outcome = prober.probe(target).await;
                        results.send(outcome);
                    })
                    .await;

                if let Err(e) = submitted {
                    fatal = Some(e);
                    break;
                }
            }
        }
    }

    // Every task owns a sink handle, so all of them must be done before
    // the sink can drain
    limiter.wait_idle().await;
    debug_assert_eq!(limiter.in_flight(), 0);
    drop(results);

    let summary = sink.finish().await?;
    log::debug!(
        "Run finished: {} outcomes, peak {} in flight",
        summary.total,
        limiter.peak()
    );

    match fatal {
        Some(e) => Err(e),
        None => Ok(RunReport {
            summary,
            peak_in_flight: limiter.peak(),
        }),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is stream::unfold?
//    - Builds a Stream from a state value and an async step function
//    - Each step returns Some((item, next_state)) or None to end the stream
//    - Here the state is the reader, so every step reads one more line
//
// 2. Why String::from_utf8_lossy instead of String::from_utf8?
//    - from_utf8 fails on the first invalid byte
//    - from_utf8_lossy swaps invalid bytes for the replacement character
//    - It returns Cow: Borrowed when the bytes were already valid, Owned when
//      something had to be replaced
//
// 3. Why `S: Stream + Unpin`?
//    - `lines.next()` needs to poll the stream through a plain &mut
//    - Unpin says the stream may be moved while being polled
//    - Streams that aren't Unpin (like unfold) can be wrapped in Box::pin
//
// 4. Why drop(results) before sink.finish()?
//    - The sink only stops when every sender is gone
//    - Forgetting one handle would make finish() wait forever
// -----------------------------------------------------------------------------
