//! NEST Core - Fundamental types for nested structures
//!
//! This crate defines the value model every traversal operates on:
//! - Values, leaves and containers (Sequence, Mapping, MappingView, Record)
//! - Mapping keys and their ordering rules
//! - Record types and composite contracts
//! - Type tags for opaque framework values
//! - Structural roles, paths, configuration and errors

pub mod key;
pub mod tag;
pub mod record;
pub mod composite;
pub mod value;
pub mod kind;
pub mod path;
pub mod config;
pub mod error;

pub use key::*;
pub use tag::*;
pub use record::*;
pub use composite::*;
pub use value::*;
pub use kind::*;
pub use path::*;
pub use config::*;
pub use error::*;
