// src/pipeline/mod.rs
// =============================================================================
// Wires parser, limiter, executor and result sink into one run.
//
// Submodules:
// - driver: Reads lines and submits probes until everything completed
// - sink: Forwards outcomes to the reporter as they complete
// =============================================================================

mod driver;
mod sink;

pub use driver::{read_lines, run_file, run_lines, RunReport};
pub use sink::{Reporter, ResultSink, SinkHandle, Summary};
