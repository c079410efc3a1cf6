pub mod advice;
pub mod client;
pub mod correct;
pub mod error;
pub mod models;
pub mod parse;
pub mod prompts;
pub mod retry;

pub use advice::study_advice;
pub use client::GeminiClient;
pub use correct::correct_text;
pub use error::LlmError;
pub use models::ModelInfo;
