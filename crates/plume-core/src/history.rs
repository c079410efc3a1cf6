//! Persisted correction records.

use crate::correction::CorrectionItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Data needed to save one correction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCorrectionParams {
    pub original_text: String,
    pub corrected_text: String,
    pub corrections: Vec<CorrectionItem>,
}

/// A correction as stored on disk. Immutable after creation; removed only
/// by explicit deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCorrection {
    pub id: Uuid,
    pub user_id: String,
    pub original_text: String,
    pub corrected_text: String,
    pub corrections: Vec<CorrectionItem>,
    pub created_at: DateTime<Utc>,
}

impl StoredCorrection {
    pub fn new(user_id: &str, params: SaveCorrectionParams) -> Self {
        StoredCorrection {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            original_text: params.original_text,
            corrected_text: params.corrected_text,
            corrections: params.corrections,
            created_at: Utc::now(),
        }
    }
}
