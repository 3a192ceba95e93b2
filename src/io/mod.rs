//! Schedule input/output utilities.

pub mod export;
