//! The interview engine: session state, phase machine, capability dispatch,
//! question generation, and the post-interview evaluation pipeline.

pub mod dispatcher;
pub mod evaluator;
pub mod handlers;
pub mod prompts;
pub mod questions;
pub mod recommendation;
pub mod session;
pub mod state_machine;
pub mod summarizer;
