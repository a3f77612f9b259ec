use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::program::{CompressionMode, TreatmentMode};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Manual,
    Program,
}

/// Operative configuration at the moment a session ended: live overrides
/// falling back to the session config. Mode fields come from the config
/// only; overrides never apply to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub temperature: Option<i32>,
    pub compression_level: Option<u8>,
    pub compression_mode: Option<CompressionMode>,
    pub treatment_mode: Option<TreatmentMode>,
}

/// Immutable history entry produced when a session ends. History is
/// prepend-ordered; existing entries never change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub ended_at: DateTime<Utc>,
    pub name: String,
    pub duration_min: u32,
    pub score: u8,
    pub kind: RecordKind,
    pub config: ConfigSnapshot,
}
