//! Reliability experiment drivers
//!
//! Everything here sits on top of the library's public API:
//! - Building base topologies with random capacities
//! - Sweeping demand, capacity and topology size
//! - Printing per-step reliability tables

pub mod config;
pub mod runner;
pub mod stats;
pub mod topology;
