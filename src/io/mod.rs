//! Result serialization.

pub mod export;
