//! Input/output helpers.
//!
//! - model artifacts and the startup model store (`artifact`, `store`)
//! - applicant profiles from JSON / `Key=Value` arguments (`profile`)
//! - attribution exports to CSV (`export`)

pub mod artifact;
pub mod export;
pub mod profile;
pub mod store;

pub use artifact::*;
pub use export::*;
pub use profile::*;
pub use store::*;
