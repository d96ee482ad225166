//! Core domain model for alpenflora.
//!
//! This crate defines the botanical record model (taxa, localized
//! entries, flower records), the illustration model (media candidates,
//! harvested plates), and the on-disk layers that persist them: the JSON
//! record store and the asset catalog.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod model;
pub mod store;

pub use error::{Error, Result};
