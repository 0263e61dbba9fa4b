// src/target/mod.rs
// =============================================================================
// This module turns raw input lines into probe targets.
//
// Submodules:
// - parse: Splits a line into method + URL and validates both
//
// A Target only ever exists after validation succeeded, so everything
// downstream (limiter, executor) can trust its method and URL scheme.
// =============================================================================

mod parse;

pub use parse::{parse_line, ParsedLine};

use std::fmt;
use std::str::FromStr;

// The HTTP methods a target line may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
}

impl Method {
    /// Method used when a line only carries a URL
    pub const DEFAULT: Method = Method::Head;

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Trace => "TRACE",
        }
    }

    // Converts to the method type reqwest expects
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Trace => reqwest::Method::TRACE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Parsing is exact: callers uppercase the token first
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "TRACE" => Ok(Method::Trace),
            _ => Err(()),
        }
    }
}

/// A validated (method, URL) pair ready for dispatch.
///
/// The URL is known to start with `http://` or `https://`; whether the rest
/// of it parses is only checked by the probe executor at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    method: Method,
    url: String,
}

impl Target {
    pub(crate) fn new(method: Method, url: String) -> Self {
        Self { method, url }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
