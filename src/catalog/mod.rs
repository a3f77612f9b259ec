//! Program catalog: the fixed official programs plus the user's custom
//! routines (save, delete, clone). Official programs are never mutated.

use std::sync::{Arc, RwLock};

use anyhow::{bail, Result};
use uuid::Uuid;

use crate::models::{limits, CompressionMode, Program, ProgramSegment, SegmentKind};

/// The factory catalog shipped with the device.
pub fn official_programs() -> Vec<Program> {
    vec![
        Program {
            id: "official-1".to_string(),
            name: "Contrast Recovery (冷热交替)".to_string(),
            description: "Warm Up → Deep Cool → Flush".to_string(),
            duration_min: 25,
            segment_label: Program::segment_label_for(3),
            segments: vec![
                ProgramSegment {
                    id: "1".to_string(),
                    name: "热敷预热 (Warm Up)".to_string(),
                    duration_min: 5,
                    kind: SegmentKind::Hot,
                    temperature: Some(40),
                    compression_level: Some(limits::DEFAULT_COMPRESSION_LEVEL),
                    compression_mode: Some(CompressionMode::Wave),
                },
                ProgramSegment {
                    id: "2".to_string(),
                    name: "深层冷疗 (Deep Cool)".to_string(),
                    duration_min: 15,
                    kind: SegmentKind::Cold,
                    temperature: Some(10),
                    compression_level: Some(limits::DEFAULT_COMPRESSION_LEVEL),
                    compression_mode: Some(CompressionMode::Wave),
                },
                ProgramSegment {
                    id: "3".to_string(),
                    name: "气压排酸 (Flush)".to_string(),
                    duration_min: 5,
                    kind: SegmentKind::Pressure,
                    temperature: None,
                    compression_level: Some(limits::DEFAULT_COMPRESSION_LEVEL),
                    compression_mode: Some(CompressionMode::Wave),
                },
            ],
        },
        Program {
            id: "official-2".to_string(),
            name: "Deep Cold Therapy".to_string(),
            description: "10°C Continuous".to_string(),
            duration_min: 15,
            segment_label: Program::segment_label_for(1),
            segments: vec![ProgramSegment {
                id: "1".to_string(),
                name: "Deep Cold".to_string(),
                duration_min: 15,
                kind: SegmentKind::Cold,
                temperature: Some(10),
                compression_level: Some(limits::DEFAULT_COMPRESSION_LEVEL),
                compression_mode: Some(CompressionMode::Overall),
            }],
        },
        Program {
            id: "official-3".to_string(),
            name: "Warm Recovery".to_string(),
            description: "40°C Gentle Heat".to_string(),
            duration_min: 20,
            segment_label: Program::segment_label_for(1),
            segments: vec![ProgramSegment {
                id: "1".to_string(),
                name: "Gentle Heat".to_string(),
                duration_min: 20,
                kind: SegmentKind::Hot,
                temperature: Some(40),
                compression_level: Some(limits::DEFAULT_COMPRESSION_LEVEL),
                compression_mode: Some(CompressionMode::Overall),
            }],
        },
    ]
}

/// A routine being authored. Segments are appended with per-kind defaults
/// and can then be edited in place before saving.
#[derive(Debug, Clone)]
pub struct RoutineDraft {
    pub name: String,
    segments: Vec<ProgramSegment>,
}

impl RoutineDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            segments: Vec::new(),
        }
    }

    /// Append a segment pre-filled with the defaults for its kind.
    pub fn add_segment(&mut self, kind: SegmentKind) -> &ProgramSegment {
        self.segments.push(default_segment(kind));
        self.segments.last().expect("segment just pushed")
    }

    pub fn push_segment(&mut self, segment: ProgramSegment) {
        self.segments.push(segment);
    }

    pub fn remove_segment(&mut self, id: &str) -> bool {
        let before = self.segments.len();
        self.segments.retain(|segment| segment.id != id);
        self.segments.len() != before
    }

    pub fn segment_mut(&mut self, id: &str) -> Option<&mut ProgramSegment> {
        self.segments.iter_mut().find(|segment| segment.id == id)
    }

    pub fn segments(&self) -> &[ProgramSegment] {
        &self.segments
    }

    pub fn total_duration_min(&self) -> u32 {
        self.segments.iter().map(|segment| segment.duration_min).sum()
    }

    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty() && !self.segments.is_empty()
    }

    fn build(self) -> Program {
        let description = self
            .segments
            .iter()
            .map(|segment| segment_title(segment.kind))
            .collect::<Vec<_>>()
            .join(" → ");
        Program {
            id: format!("custom_{}", Uuid::new_v4()),
            name: self.name,
            description,
            duration_min: self.segments.iter().map(|s| s.duration_min).sum(),
            segment_label: Program::segment_label_for(self.segments.len()),
            segments: self.segments,
        }
    }
}

fn segment_title(kind: SegmentKind) -> &'static str {
    match kind {
        SegmentKind::Cold => "COLD Segment",
        SegmentKind::Hot => "HEAT Segment",
        SegmentKind::Pressure => "PRESSURE Segment",
    }
}

fn default_segment(kind: SegmentKind) -> ProgramSegment {
    let (duration_min, temperature, compression_level) = match kind {
        SegmentKind::Cold => (15, Some(limits::DEFAULT_COLD_TEMP_C), Some(2)),
        SegmentKind::Hot => (15, Some(limits::DEFAULT_HOT_TEMP_C), Some(2)),
        SegmentKind::Pressure => (20, None, Some(3)),
    };
    ProgramSegment {
        id: format!("segment-{}", Uuid::new_v4()),
        name: segment_title(kind).to_string(),
        duration_min,
        kind,
        temperature,
        compression_level,
        compression_mode: Some(CompressionMode::Wave),
    }
}

#[derive(Clone)]
pub struct ProgramCatalog {
    official: Arc<Vec<Program>>,
    custom: Arc<RwLock<Vec<Program>>>,
}

impl Default for ProgramCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramCatalog {
    pub fn new() -> Self {
        Self {
            official: Arc::new(official_programs()),
            custom: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn official(&self) -> Vec<Program> {
        self.official.as_ref().clone()
    }

    pub fn custom(&self) -> Vec<Program> {
        self.custom.read().unwrap().clone()
    }

    pub fn find(&self, id: &str) -> Option<Program> {
        self.official
            .iter()
            .find(|program| program.id == id)
            .cloned()
            .or_else(|| {
                self.custom
                    .read()
                    .unwrap()
                    .iter()
                    .find(|program| program.id == id)
                    .cloned()
            })
    }

    /// Save an authored routine into the custom collection.
    pub fn save_routine(&self, draft: RoutineDraft) -> Result<Program> {
        if draft.name.trim().is_empty() {
            bail!("routine name must not be empty");
        }
        if draft.segments().is_empty() {
            bail!("routine must contain at least one segment");
        }
        let program = draft.build();
        self.custom.write().unwrap().push(program.clone());
        Ok(program)
    }

    pub fn delete_custom(&self, id: &str) -> bool {
        let mut custom = self.custom.write().unwrap();
        let before = custom.len();
        custom.retain(|program| program.id != id);
        custom.len() != before
    }

    /// Copy an official program into the custom collection under a
    /// "(Copy)" name. Returns the clone, or None for an unknown id.
    pub fn clone_official(&self, id: &str) -> Option<Program> {
        let source = self.official.iter().find(|program| program.id == id)?;
        let clone = Program {
            id: format!("copy_{}", Uuid::new_v4()),
            name: format!("(Copy) {}", source.name),
            ..source.clone()
        };
        self.custom.write().unwrap().push(clone.clone());
        Some(clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_catalog_is_consistent() {
        let programs = official_programs();
        assert_eq!(programs.len(), 3);
        for program in &programs {
            let segment_sum: u32 = program.segments.iter().map(|s| s.duration_min).sum();
            assert_eq!(program.duration_min, segment_sum, "{}", program.name);
            assert_eq!(
                program.segment_label,
                Program::segment_label_for(program.segments.len())
            );
        }
    }

    #[test]
    fn contrast_recovery_alternates_hot_cold_pressure() {
        let programs = official_programs();
        let contrast = &programs[0];
        let kinds: Vec<SegmentKind> = contrast.segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SegmentKind::Hot, SegmentKind::Cold, SegmentKind::Pressure]
        );
        assert_eq!(contrast.segments[1].temperature, Some(10));
    }

    #[test]
    fn draft_builds_program_with_summary_description() {
        let mut draft = RoutineDraft::new("Leg Day Recovery");
        draft.add_segment(SegmentKind::Cold);
        draft.add_segment(SegmentKind::Hot);
        assert!(draft.can_save());
        assert_eq!(draft.total_duration_min(), 30);

        let catalog = ProgramCatalog::new();
        let program = catalog.save_routine(draft).unwrap();
        assert_eq!(program.name, "Leg Day Recovery");
        assert_eq!(program.description, "COLD Segment → HEAT Segment");
        assert_eq!(program.duration_min, 30);
        assert_eq!(program.segment_label, "2 segments");
        assert_eq!(catalog.custom().len(), 1);
        assert!(catalog.find(&program.id).is_some());
    }

    #[test]
    fn draft_segment_defaults_per_kind() {
        let mut draft = RoutineDraft::new("x");
        let pressure = draft.add_segment(SegmentKind::Pressure).clone();
        assert_eq!(pressure.duration_min, 20);
        assert_eq!(pressure.temperature, None);
        assert_eq!(pressure.compression_level, Some(3));
        assert_eq!(pressure.compression_mode, Some(CompressionMode::Wave));
    }

    #[test]
    fn empty_drafts_are_rejected() {
        let catalog = ProgramCatalog::new();
        assert!(catalog.save_routine(RoutineDraft::new("")).is_err());

        let named_but_empty = RoutineDraft::new("Named");
        assert!(!named_but_empty.can_save());
        assert!(catalog.save_routine(named_but_empty).is_err());
    }

    #[test]
    fn clone_official_prefixes_name_and_keeps_segments() {
        let catalog = ProgramCatalog::new();
        let clone = catalog.clone_official("official-1").unwrap();
        assert!(clone.name.starts_with("(Copy) Contrast Recovery"));
        assert_ne!(clone.id, "official-1");
        assert_eq!(clone.segments.len(), 3);
        assert_eq!(catalog.custom().len(), 1);

        // the official entry is untouched
        assert_eq!(catalog.official().len(), 3);
        assert!(catalog.clone_official("nope").is_none());
    }

    #[test]
    fn delete_removes_only_custom_programs() {
        let catalog = ProgramCatalog::new();
        let clone = catalog.clone_official("official-2").unwrap();
        assert!(catalog.delete_custom(&clone.id));
        assert!(!catalog.delete_custom(&clone.id));
        assert!(!catalog.delete_custom("official-1"));
        assert_eq!(catalog.official().len(), 3);
    }

    #[test]
    fn draft_segments_are_editable_in_place() {
        let mut draft = RoutineDraft::new("Edit me");
        let id = draft.add_segment(SegmentKind::Cold).id.clone();
        {
            let segment = draft.segment_mut(&id).unwrap();
            segment.duration_min = 10;
            segment.temperature = Some(7);
        }
        assert_eq!(draft.total_duration_min(), 10);
        assert!(draft.remove_segment(&id));
        assert!(!draft.remove_segment(&id));
        assert!(!draft.can_save());
    }
}
