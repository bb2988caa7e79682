//! Chat Session - turn-based conversation with a local model
//!
//! This crate provides the conversational core of the client:
//! - Ordered turn history owned by one session
//! - Request assembly (system prompt once, then prior turns, then the new message)
//! - Splitting raw model output into a reasoning segment and the final answer
//! - A best-effort probe for models whose template emits reasoning

pub mod reasoning;
pub mod session;

#[cfg(test)]
mod testing;

pub use reasoning::{split_reasoning, GenerationResult, REASONING_CLOSE, REASONING_OPEN};
pub use session::{capability_probe, ChatSession, SessionConfig, Turn};
