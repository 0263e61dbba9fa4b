// src/probe/mod.rs
// =============================================================================
// Everything that happens after a line became a Target.
//
// Submodules:
// - outcome: The terminal result of one target
// - limiter: Caps how many probes are in flight at once
// - executor: Runs one request against its deadline and classifies it
// =============================================================================

mod executor;
mod limiter;
mod outcome;

pub use executor::Prober;
pub use limiter::Limiter;
pub use outcome::{is_alive_status, Outcome, OutcomeKind};
