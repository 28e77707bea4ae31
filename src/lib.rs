//! Category tree editor for the pharmacy admin back-office.
//!
//! See [`features::categories`] for the tree store, reconciler and mutation
//! gateway.

pub mod core;
pub mod features;
pub mod shared;
