// src/target/parse.rs
// =============================================================================
// Parses one line of the target list.
//
// Line format:  [METHOD] URL
// - METHOD is optional and case-insensitive, defaults to HEAD
// - blank lines and lines starting with '#' are skipped
// - anything after the second token is ignored
//
// Every line ends up as exactly one of: skipped, a Target, or a rejected
// Outcome. Rejected lines never reach the network.
// =============================================================================

use super::{Method, Target};
use crate::probe::Outcome;

const URL_PREFIXES: [&str; 2] = ["http://", "https://"];

// What a single input line turned into
#[derive(Debug)]
pub enum ParsedLine {
    /// Blank line or comment, produces no outcome
    Skip,
    /// Valid line, ready to be probed
    Target(Target),
    /// Invalid line, already resolved to its terminal outcome
    Rejected(Outcome),
}

pub fn parse_line(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        log::debug!("Ignoring line: {}", line);
        return ParsedLine::Skip;
    }

    let mut tokens = trimmed.split_whitespace();
    let (method_token, url) = match (tokens.next(), tokens.next()) {
        (Some(method), Some(url)) => (method.to_uppercase(), url),
        (Some(url), None) => (Method::DEFAULT.as_str().to_string(), url),
        // trimmed is non-empty, so there is always a first token
        (None, _) => return ParsedLine::Skip,
    };

    log::debug!("Processing line: method={} url={}", method_token, url);

    let method = match method_token.parse::<Method>() {
        Ok(method) => method,
        Err(()) => {
            log::warn!("Invalid method: {}", method_token);
            return ParsedLine::Rejected(Outcome::invalid_method(url, &method_token));
        }
    };

    if !URL_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
        log::warn!("Invalid URL format: {}", url);
        return ParsedLine::Rejected(Outcome::invalid_url(
            url,
            method.as_str(),
            "URL must start with http:// or https://".to_string(),
        ));
    }

    ParsedLine::Target(Target::new(method, url.to_string()))
}
