//! `depthcmp-core` -- shared domain logic for the depth-supervision
//! comparison tools.
//!
//! Everything here is free of terminal output: event-log decoding,
//! statistics, metric naming, and the trainer's argument and process
//! interfaces. The binaries in the sibling crates do the printing.

pub mod error;
pub mod events;
pub mod metric_names;
pub mod series;
pub mod shutdown;
pub mod stats;
pub mod trainer;
pub mod types;
