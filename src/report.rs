// src/report.rs
// =============================================================================
// Reporters: turn outcomes into output as soon as they arrive.
//
// - TextReporter: one block per result plus a summary at the end
// - JsonReporter: one JSON object per line, then a summary line; every
//   line has a "type" of "result" or "summary"
//
// Both write to any `Write`, so tests can capture the output in a Vec<u8>.
// =============================================================================

use serde::Serialize;
use std::io::{self, Write};

use crate::pipeline::{Reporter, Summary};
use crate::probe::{Outcome, OutcomeKind};

// Shown when a field has no value
const NOT_AVAILABLE: &str = "N/A";

pub struct TextReporter<W> {
    out: W,
}

impl TextReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        // Failures have no status code, so their kind goes in that column
        let status_code = match (outcome.kind, outcome.status_code) {
            (OutcomeKind::Success, Some(code)) => code.to_string(),
            (kind, _) => kind.label().to_string(),
        };
        // A 404 is a response ("Not Alive"); a timeout is not ("Not Reachable")
        let status = match (outcome.kind, outcome.is_alive()) {
            (_, true) => "Alive",
            (OutcomeKind::Success, false) => "Not Alive",
            _ => "Not Reachable",
        };

        writeln!(self.out, "URL: {}", outcome.url)?;
        writeln!(self.out, "  Method: {}", outcome.method)?;
        writeln!(self.out, "  Status Code: {}", status_code)?;
        writeln!(self.out, "  Status: {}", status)?;
        writeln!(
            self.out,
            "  Redirected To: {}",
            outcome.redirect_location.as_deref().unwrap_or(NOT_AVAILABLE)
        )?;
        if let Some(detail) = outcome.detail.as_deref().filter(|d| !d.is_empty()) {
            writeln!(self.out, "  Detail: {}", detail)?;
        }
        writeln!(
            self.out,
            "  Checked At: {}",
            outcome.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(self.out, "{}", "-".repeat(39))?;
        // Flush each block so results show up while the run is still going
        self.out.flush()
    }

    fn write_summary(&mut self, summary: &Summary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "📊 Summary:")?;
        writeln!(self.out, "   ✅ Alive: {}", summary.alive)?;
        writeln!(self.out, "   ❌ Not alive: {}", summary.not_alive())?;
        for kind in OutcomeKind::ALL {
            let count = summary.count(kind);
            // Success is already covered by the alive / not alive lines
            if count > 0 && kind != OutcomeKind::Success {
                writeln!(self.out, "      {}: {}", kind.label(), count)?;
            }
        }
        writeln!(self.out, "   📋 Total: {}", summary.total)?;
        self.out.flush()
    }
}

impl<W: Write + Send> Reporter for TextReporter<W> {
    fn report(&mut self, outcome: &Outcome) {
        if let Err(e) = self.write_outcome(outcome) {
            log::error!("Failed to write result for {}: {}", outcome.url, e);
        }
    }

    fn finish(&mut self, summary: &Summary) {
        if let Err(e) = self.write_summary(summary) {
            log::error!("Failed to write summary: {}", e);
        }
    }
}

// Every JSON line carries a "type" field so consumers can tell results
// apart from the final summary line
const RESULT_TYPE: &str = "result";
const SUMMARY_TYPE: &str = "summary";

// JSON view of an outcome with the derived aliveness included
//
// #[serde(flatten)] inlines the Outcome fields next to "type" and "alive"
// instead of nesting them under an "outcome" key
#[derive(Serialize)]
struct Record<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    #[serde(flatten)]
    outcome: &'a Outcome,
    alive: bool,
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    #[serde(flatten)]
    summary: &'a Summary,
}

pub struct JsonReporter<W> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn report(&mut self, outcome: &Outcome) {
        let record = Record {
            record_type: RESULT_TYPE,
            outcome,
            alive: outcome.is_alive(),
        };
        if let Err(e) = self.write_line(&record) {
            log::error!("Failed to write result for {}: {}", outcome.url, e);
        }
    }

    fn finish(&mut self, summary: &Summary) {
        let record = SummaryRecord {
            record_type: SUMMARY_TYPE,
            summary,
        };
        if let Err(e) = self.write_line(&record) {
            log::error!("Failed to write summary: {}", e);
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why are the reporters generic over W: Write?
//    - The binary writes to stdout, tests write to a Vec<u8>
//    - Same code for both, no mocking needed
//
// 2. Why does report() log errors instead of returning them?
//    - A broken stdout (e.g. a closed pipe) shouldn't stop the probes
//    - The Reporter trait has no Result to return into
//
// 3. What is JSON lines?
//    - One complete JSON object per line
//    - Tools like `jq` can process the output while it is still streaming
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{parse_line, ParsedLine};

    fn redirect_outcome() -> Outcome {
        match parse_line("GET http://a.example") {
            ParsedLine::Target(target) => Outcome::success(&target, 301, Some("https://b".into())),
            other => panic!("expected target, got {:?}", other),
        }
    }

    #[test]
    fn test_text_block() {
        let mut reporter = TextReporter::new(Vec::new());
        reporter.report(&redirect_outcome());
        reporter.report(&Outcome::invalid_method("http://c.example", "FOO"));

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("URL: http://a.example"));
        assert!(text.contains("  Status Code: 301"));
        assert!(text.contains("  Status: Alive"));
        assert!(text.contains("  Redirected To: https://b"));
        assert!(text.contains("  Status Code: Invalid Method"));
        assert!(text.contains("  Status: Not Reachable"));
        assert!(text.contains("  Redirected To: N/A"));
    }

    #[test]
    fn test_text_summary_lists_failure_kinds() {
        let mut summary = Summary::default();
        summary.record(&redirect_outcome());
        summary.record(&Outcome::invalid_method("http://c.example", "FOO"));

        let mut reporter = TextReporter::new(Vec::new());
        reporter.finish(&summary);

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Alive: 1"));
        assert!(text.contains("Invalid Method: 1"));
        assert!(!text.contains("Timeout:"));
        assert!(text.contains("Total: 2"));
    }

    #[test]
    fn test_json_lines() {
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.report(&redirect_outcome());
        reporter.finish(&Summary::default());

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "result");
        assert_eq!(lines[0]["kind"], "success");
        assert_eq!(lines[0]["status_code"], 301);
        assert_eq!(lines[0]["redirect_location"], "https://b");
        assert_eq!(lines[0]["alive"], true);
        assert_eq!(lines[1]["type"], "summary");
        assert_eq!(lines[1]["total"], 0);
        assert!(lines[1].get("kind").is_none());
    }
}
