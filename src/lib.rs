//! tinybuild library crate
//!
//! An incremental C++ build engine: dependencies are inferred from the
//! headers each file includes, flags from comments in the sources, and only
//! artifacts older than their inputs are rebuilt. The binary is a thin CLI
//! over this library.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod flags;
pub mod graph;
pub mod includes;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod project;
pub mod propagate;
pub mod staleness;
pub mod theme;
pub mod toolchain;
pub mod utils;
