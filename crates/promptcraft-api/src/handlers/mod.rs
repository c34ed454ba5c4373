//! HTTP handlers for promptcraft-api.

pub mod page;
pub mod prompts;
