//! Schema registry and feature encoding.
//!
//! - `registry`: the two fixed, versioned feature schemas
//! - `encode`: raw applicant profile → ordered numeric vector

pub mod encode;
pub mod registry;

pub use encode::*;
pub use registry::*;
