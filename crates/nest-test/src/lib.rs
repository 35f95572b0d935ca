//! NEST Test Harness - Generators, sample composites and conformance checks
//!
//! This crate provides:
//! - Seeded random structure generation
//! - Sample composites (sparse and ragged tensors)
//! - A conformance runner checking engine properties over generated input

pub mod composites;
pub mod generator;
pub mod conformance;

pub use composites::*;
pub use generator::*;
pub use conformance::*;
