//! Numeric utilities: normalization and link functions.

pub mod link;
pub mod normalize;

pub use link::*;
pub use normalize::*;
