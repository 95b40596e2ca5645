//! Core type definitions used across the mediadesk workspace.

pub mod id;

pub use id::*;
