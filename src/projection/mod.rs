//! Derived view module.
//!
//! Distinct project, subsystem and component lists projected from the
//! latest-build snapshot.

pub mod distinct;

pub use distinct::*;
