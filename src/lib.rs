//! Hierarchical clustering of sequence motifs and consensus motif construction in Rust

pub mod cluster;
pub mod compare;
pub mod config;
pub mod consensus;
pub mod error;
pub mod io;
pub mod linkage;
pub mod matrix;
pub mod motif;
pub mod pipeline;
pub mod stats;
pub mod types;
