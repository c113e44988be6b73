//! Adapters module — user-facing front ends.
//!
//! - **CLI** — interactive and single-shot command line interface

pub mod cli;
