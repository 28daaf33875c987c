//! Worker/collector pairs and the merge controller.
//!
//! Every worker pulls from the same multi-consumer input queue, so whichever
//! worker is idle first takes the next value. Each worker owns a private
//! output queue drained by exactly one collector, and all collectors forward
//! into one merged queue.
//!
//! ## Structure
//!
//! - [`worker`]: forwards values from the shared queue after a delay.
//! - [`collector`]: tallies one worker's output into the merged queue.
//! - [`merger`]: joins every collector, then closes the merged queue.

mod collector;
mod merger;
mod worker;

pub use collector::*;
pub use merger::*;
pub use worker::*;
