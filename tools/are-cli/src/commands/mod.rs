//! CLI command implementations

pub mod codec;
pub mod get;
pub mod subscribe;
