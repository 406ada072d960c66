//! Command implementations.

pub mod accept;
pub mod check;
pub mod equipment;
