// src/probe/outcome.rs
// =============================================================================
// The result of attempting one target.
//
// An Outcome is created exactly once per non-skipped input line, either by the
// line parser (invalid method / URL) or by the probe executor (success, error,
// timeout). It is never modified after that; it is moved into the result sink.
//
// "Alive" is not stored. It is derived from the status code so that any
// consumer can recompute it the same way.
// =============================================================================

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::target::Target;

// Every line that is not skipped ends up in exactly one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// A response was received (any status code)
    Success,
    /// Transport failure before a response (DNS, refused, TLS, reset...)
    Error,
    /// The deadline elapsed before a response arrived
    Timeout,
    /// The method token is not one we support
    InvalidMethod,
    /// Wrong scheme prefix, or the URL does not parse
    InvalidUrl,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 5] = [
        OutcomeKind::Success,
        OutcomeKind::Error,
        OutcomeKind::Timeout,
        OutcomeKind::InvalidMethod,
        OutcomeKind::InvalidUrl,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "Success",
            OutcomeKind::Error => "Error",
            OutcomeKind::Timeout => "Timeout",
            OutcomeKind::InvalidMethod => "Invalid Method",
            OutcomeKind::InvalidUrl => "Invalid URL",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// The URL as it appeared in the input
    pub url: String,
    /// The method, or the raw uppercased token when it was invalid
    pub method: String,
    pub kind: OutcomeKind,
    /// Only set for `Success`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Value of the Location header, when the response had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_location: Option<String>,
    /// Diagnostic message for the non-success kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Local>,
}

// True for 2xx and 3xx: redirects count as alive
pub fn is_alive_status(code: u16) -> bool {
    (200..400).contains(&code)
}

impl Outcome {
    fn new(url: &str, method: &str, kind: OutcomeKind) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            kind,
            status_code: None,
            redirect_location: None,
            detail: None,
            timestamp: Local::now(),
        }
    }

    pub fn invalid_method(url: &str, method: &str) -> Self {
        Self::new(url, method, OutcomeKind::InvalidMethod)
    }

    pub fn invalid_url(url: &str, method: &str, detail: String) -> Self {
        Self {
            detail: Some(detail),
            ..Self::new(url, method, OutcomeKind::InvalidUrl)
        }
    }

    pub fn success(target: &Target, status_code: u16, redirect_location: Option<String>) -> Self {
        Self {
            status_code: Some(status_code),
            redirect_location,
            ..Self::new(target.url(), target.method().as_str(), OutcomeKind::Success)
        }
    }

    pub fn error(target: &Target, detail: String) -> Self {
        Self {
            detail: Some(detail),
            ..Self::new(target.url(), target.method().as_str(), OutcomeKind::Error)
        }
    }

    pub fn timeout(target: &Target, detail: String) -> Self {
        Self {
            detail: Some(detail),
            ..Self::new(target.url(), target.method().as_str(), OutcomeKind::Timeout)
        }
    }

    /// Whether the target counts as reachable: a response with a 2xx or 3xx code.
    pub fn is_alive(&self) -> bool {
        match (self.kind, self.status_code) {
            (OutcomeKind::Success, Some(code)) => is_alive_status(code),
            _ => false,
        }
    }
}
