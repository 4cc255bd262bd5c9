//! Entity store implementations.

pub mod local;
