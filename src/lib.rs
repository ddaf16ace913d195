//! Server-side Matter application clusters: a door lock with remote
//! credential checks, and general diagnostics with fault reporting.
//!
//! Wire encoding, sessions and endpoint discovery live elsewhere; this crate
//! works on decoded paths and values, and on an [`AttributeStore`] owned by
//! the host.
//!
//! [`AttributeStore`]: data_model::store::AttributeStore

#[macro_use]
extern crate num_derive;

/// Cluster definitions and servers
pub mod cluster;
pub mod constants;
pub mod data_model;
pub mod error;
pub mod interaction_model;
pub mod util;

pub use error::Error;
