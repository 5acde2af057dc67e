//! Routes free-text task descriptions to file-processing handlers.

pub mod config;
pub mod consts;
pub mod engine;
pub mod handlers;
pub mod llm;
pub mod server;
