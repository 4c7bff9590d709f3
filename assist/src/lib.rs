//! # Note Assistance
//!
//! Implementations of [`cf_core::NoteAssistant`]: an OpenAI-compatible
//! chat-completions backend and a canned mock for tests. The prompts are the
//! product surface here; everything else is plumbing.

pub mod mock;
pub mod openai;
mod prompts;

pub use mock::MockAssistant;
pub use openai::{OpenAiAssistant, OpenAiConfig};
