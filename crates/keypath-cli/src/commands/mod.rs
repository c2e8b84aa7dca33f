//! CLI command implementations.

pub mod common;
pub mod export;
pub mod graphs;
pub mod run;
pub mod trace;
pub mod validate;
