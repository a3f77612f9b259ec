use serde::{Deserialize, Serialize};

/// Physical modality a session (or manual configuration) drives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TreatmentMode {
    Cold,
    Hot,
    CompressionOnly,
}

impl TreatmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentMode::Cold => "cold",
            TreatmentMode::Hot => "hot",
            TreatmentMode::CompressionOnly => "compression-only",
        }
    }
}

/// Thermal configuration of a manual session. Temperature only exists for
/// the thermal modes; compression-only sessions carry none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Treatment {
    Cold { temperature: i32 },
    Hot { temperature: i32 },
    CompressionOnly,
}

impl Treatment {
    pub fn mode(&self) -> TreatmentMode {
        match self {
            Treatment::Cold { .. } => TreatmentMode::Cold,
            Treatment::Hot { .. } => TreatmentMode::Hot,
            Treatment::CompressionOnly => TreatmentMode::CompressionOnly,
        }
    }

    pub fn temperature(&self) -> Option<i32> {
        match self {
            Treatment::Cold { temperature } | Treatment::Hot { temperature } => Some(*temperature),
            Treatment::CompressionOnly => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    Overall,
    Flow,
    Wave,
    Custom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Hot,
    Cold,
    Pressure,
}

/// One sub-phase of a program. Segments are ordered and copied into the
/// session plan at start time, never referenced live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSegment {
    pub id: String,
    pub name: String,
    pub duration_min: u32,
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub temperature: Option<i32>,
    pub compression_level: Option<u8>,
    pub compression_mode: Option<CompressionMode>,
}

impl ProgramSegment {
    pub fn duration_secs(&self) -> u32 {
        self.duration_min * 60
    }
}

/// A therapy program: immutable once created. Built-in programs live in the
/// official catalog; user routines are held in the custom collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_min: u32,
    pub segment_label: String,
    pub segments: Vec<ProgramSegment>,
}

impl Program {
    pub fn segment_label_for(count: usize) -> String {
        format!("{} segment{}", count, if count == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treatment_exposes_temperature_only_for_thermal_modes() {
        assert_eq!(Treatment::Cold { temperature: 10 }.temperature(), Some(10));
        assert_eq!(Treatment::Hot { temperature: 40 }.temperature(), Some(40));
        assert_eq!(Treatment::CompressionOnly.temperature(), None);
        assert_eq!(
            Treatment::CompressionOnly.mode(),
            TreatmentMode::CompressionOnly
        );
    }

    #[test]
    fn treatment_mode_serializes_to_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TreatmentMode::CompressionOnly).unwrap(),
            "\"compression-only\""
        );
        assert_eq!(serde_json::to_string(&TreatmentMode::Cold).unwrap(), "\"cold\"");
    }

    #[test]
    fn segment_kind_uses_wire_spelling() {
        let segment = ProgramSegment {
            id: "1".into(),
            name: "Deep Cool".into(),
            duration_min: 15,
            kind: SegmentKind::Cold,
            temperature: Some(10),
            compression_level: Some(2),
            compression_mode: Some(CompressionMode::Wave),
        };
        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["type"], "cold");
        assert_eq!(json["compressionMode"], "wave");
    }

    #[test]
    fn segment_label_pluralizes() {
        assert_eq!(Program::segment_label_for(1), "1 segment");
        assert_eq!(Program::segment_label_for(3), "3 segments");
    }
}
