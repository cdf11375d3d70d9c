//! Command implementations

pub mod load;
