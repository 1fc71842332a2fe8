//! LLM Relay - forwards chat conversations to multiple LLM providers behind a single API.

pub mod config;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod router;
pub mod server;
