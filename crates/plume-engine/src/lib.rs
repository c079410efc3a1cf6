//! Correction engine and LLM orchestration for Plume.

pub mod llm;

pub use llm::{correct_text, study_advice, GeminiClient, LlmError, ModelInfo};
