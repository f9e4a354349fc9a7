//! Core types for emberfs.
//!
//! This crate provides the value types shared across the emberfs
//! workspace: entry identifiers, node metadata, errors, and volume
//! configuration.

mod error;
mod ids;
mod node;
mod options;

pub use error::FsError;
pub use ids::EntryId;
pub use node::{NodeKind, Timestamps};
pub use options::{VolumeOptions, VolumeOptionsBuilder};
