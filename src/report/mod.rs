//! Reporting: narratives and formatted terminal output.

pub mod format;
pub mod narrative;

pub use format::*;
pub use narrative::*;
