//! API handlers.

pub mod profile;

pub use profile::*;
