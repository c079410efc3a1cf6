//! Core domain model for Plume.

pub mod advice;
pub mod correction;
pub mod history;

pub use advice::{AdviceEntry, AdviceExample, StudyAdvice};
pub use correction::{classify_correction, CorrectionItem, CorrectionResult, CorrectionType};
pub use history::{SaveCorrectionParams, StoredCorrection};
