use crate::model::back_check::{BackCheckMetadata, BackCheckRecord, SpeciesReading, SpeciesResult};
use crate::model::species::Species;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Payload of the `json` part of a back-check submission.
/// Readings may come in any order; species without a reading count as not measured.
pub struct SubmitBackCheckRequest {
    #[serde(flatten)]
    pub metadata: BackCheckMetadata,
    #[serde(default)]
    pub readings: Vec<SpeciesReading>,
    #[serde(default)]
    pub general_remark: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub readings: Vec<SpeciesReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesPreview {
    pub species: Species,
    pub expected_width: u32,
    pub total_sockets: u64,
    pub fragment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub species: Vec<SpeciesPreview>,
    pub auto_remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTotal {
    pub species: Species,
    pub total_sockets: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitBackCheckResponse {
    pub id: i64,
    pub auto_remark: String,
    pub totals: Vec<SpeciesTotal>,
}

/// A stored record as listed by `GET /api/back_checks`, without the photo payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackCheckListItem {
    pub id: i64,
    pub metadata: BackCheckMetadata,
    pub species: [SpeciesResult; 4],
    pub auto_remark: Option<String>,
    pub general_remark: Option<String>,
    pub has_photo: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<BackCheckRecord> for BackCheckListItem {
    fn from(record: BackCheckRecord) -> Self {
        let has_photo = record.has_photo();
        BackCheckListItem {
            id: record.id,
            metadata: record.metadata,
            species: record.species,
            auto_remark: record.auto_remark,
            general_remark: record.general_remark,
            has_photo,
            created_at: record.created_at,
        }
    }
}
