// src/lib.rs
// =============================================================================
// link-prober: bounded-concurrency URL liveness probing.
//
// raw line -> target::parse_line -> Target
//          -> probe::Limiter (admission) -> probe::Prober (request vs deadline)
//          -> probe::Outcome -> pipeline::ResultSink -> Reporter
//
// The binary (main.rs) only parses arguments, sets up logging and picks a
// reporter; everything else lives here so tests can drive it directly.
// =============================================================================

pub mod cli;
pub mod config;
pub mod logger;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod target;

pub use config::ProbeConfig;
pub use pipeline::{run_file, run_lines, Reporter, RunReport, Summary};
pub use probe::{Outcome, OutcomeKind, Prober};
pub use target::{parse_line, Method, ParsedLine, Target};
