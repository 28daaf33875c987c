//! Outer layer of the binary: argument parsing, logging, and reporting.
//!
//! ## Structure
//!
//! - [`config`]: CLI/env arguments and their conversion to a
//!   [`fanline::PipelineConfig`].
//! - [`reporter`]: text or JSON output of the final report.
//! - [`telemetry`]: `tracing` subscriber setup.

pub mod config;
pub mod reporter;
pub mod telemetry;
