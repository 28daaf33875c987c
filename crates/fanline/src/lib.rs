#![doc = include_str!("../README.md")]

mod accountant;
mod config;
mod context;
mod error;
mod generator;
mod mutex;
mod phase;
mod pipeline;
mod pool;
mod report;
mod validator;

pub use crate::accountant::*;
pub use crate::config::*;
pub use crate::context::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::phase::*;
pub use crate::pipeline::*;
pub use crate::pool::*;
pub use crate::report::*;
pub use crate::validator::*;
