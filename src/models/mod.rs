//! Fitted model implementations and the task adapters built on them.
//!
//! Models are evaluated on normalized vectors and expose a single raw scalar
//! output, so that explainers can stay generic over the model kind.

pub mod linear;
pub mod model;
pub mod tree;

pub use linear::*;
pub use model::*;
pub use tree::*;
